//! Maze chase: eat the dots while ghosts wander the corridors
//!
//! The layout never changes, so the set of cells reachable from the spawn
//! is flood-filled once per [`MazeMap`] and shared by every level. Dots and
//! ghosts are only ever placed inside that set, and ghosts only step onto
//! open neighbours, so nothing can end up walled off.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use glam::IVec2;
use rand::Rng;
use serde::Serialize;

use super::grid::{Dir, clamp_cell, first_step};
use super::state::{Ctx, Outcome};
use crate::cell;
use crate::consts::*;
use crate::tuning::Tuning;

/// Static wall/floor grid plus its precomputed reachable set
#[derive(Debug, Clone)]
pub struct MazeMap {
    width: i32,
    height: i32,
    walls: Vec<bool>,
    spawn: IVec2,
    /// Reachable cells in breadth-first discovery order
    reachable: Vec<IVec2>,
    reachable_set: HashSet<IVec2>,
}

impl MazeMap {
    /// Parse a layout where `#` is a wall. Short rows are padded with wall.
    pub fn parse(rows: &[&str], spawn: IVec2) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut walls = vec![true; (width * height) as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                walls[y * width as usize + x] = ch == '#';
            }
        }

        let mut map = Self {
            width,
            height,
            walls,
            spawn,
            reachable: Vec::new(),
            reachable_set: HashSet::new(),
        };
        map.reachable = map.flood_fill(spawn);
        map.reachable_set = map.reachable.iter().copied().collect();
        map
    }

    /// The gauntlet's maze
    pub fn standard() -> Self {
        Self::parse(&MAZE_LAYOUT, cell(MAZE_SPAWN))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn spawn(&self) -> IVec2 {
        self.spawn
    }

    /// Walls, with everything outside the grid counting as wall
    pub fn is_wall(&self, pos: IVec2) -> bool {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return true;
        }
        self.walls[(pos.y * self.width + pos.x) as usize]
    }

    pub fn reachable(&self) -> &[IVec2] {
        &self.reachable
    }

    pub fn is_reachable(&self, pos: IVec2) -> bool {
        self.reachable_set.contains(&pos)
    }

    /// Breadth-first search over the four cardinal neighbours
    fn flood_fill(&self, start: IVec2) -> Vec<IVec2> {
        let mut order = Vec::new();
        if self.is_wall(start) {
            return order;
        }
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            order.push(pos);
            for dir in Dir::ALL {
                let next = pos + dir.offset();
                if !self.is_wall(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        order
    }

    /// First step of a shortest path from `from` to the nearest cell matching `goal`
    pub fn first_step_toward(&self, from: IVec2, goal: impl Fn(IVec2) -> bool) -> Option<Dir> {
        first_step(from, |p| !self.is_wall(p), goal)
    }
}

/// A dot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dot {
    pub pos: IVec2,
    /// Only ever goes false -> true
    pub eaten: bool,
}

/// A wandering ghost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ghost {
    pub pos: IVec2,
    pub facing: Dir,
}

impl Ghost {
    /// Maybe turn, then move one cell. A blocked ghost takes the first open
    /// neighbour in `Dir::ALL` order, or stays put if boxed in.
    fn step<R: Rng>(&mut self, map: &MazeMap, turn_chance: f64, rng: &mut R) {
        if rng.random_bool(turn_chance) {
            self.facing = Dir::ALL[rng.random_range(0..Dir::ALL.len())];
        }
        let ahead = self.pos + self.facing.offset();
        if !map.is_wall(ahead) {
            self.pos = ahead;
            return;
        }
        if let Some(dir) = Dir::ALL
            .into_iter()
            .find(|d| !map.is_wall(self.pos + d.offset()))
        {
            self.pos += dir.offset();
            self.facing = dir;
        }
    }
}

/// Maze level state
#[derive(Debug, Clone, Serialize)]
pub struct MazeState {
    #[serde(skip)]
    map: Arc<MazeMap>,
    pub level: u8,
    pub player: IVec2,
    pub dots: Vec<Dot>,
    pub ghosts: Vec<Ghost>,
    /// Background ghost step period for this level
    pub ghost_period_ms: u64,
    cleared: bool,
}

impl MazeState {
    pub fn new<R: Rng>(map: Arc<MazeMap>, level: u8, rng: &mut R, tuning: &Tuning) -> Self {
        let dots = place_dots(&map, rng, tuning);

        let slots: Vec<IVec2> = MAZE_GHOST_SPAWNS
            .iter()
            .map(|&xy| cell(xy))
            .filter(|&pos| map.is_reachable(pos))
            .collect();
        let ghosts: Vec<Ghost> = slots
            .iter()
            .take(tuning.ghost_count(level, slots.len()))
            .map(|&pos| Ghost {
                pos,
                facing: Dir::ALL[rng.random_range(0..Dir::ALL.len())],
            })
            .collect();

        let jitter = if tuning.ghost_period_jitter_ms > 0 {
            rng.random_range(0..tuning.ghost_period_jitter_ms)
        } else {
            0
        };

        log::debug!(
            "Maze level {}: {} dots, {} ghosts",
            level,
            dots.len(),
            ghosts.len()
        );

        Self {
            player: map.spawn(),
            map,
            level,
            dots,
            ghosts,
            ghost_period_ms: tuning.ghost_period_ms + jitter,
            cleared: false,
        }
    }

    pub fn map(&self) -> &MazeMap {
        &self.map
    }

    pub fn dots_left(&self) -> usize {
        self.dots.iter().filter(|d| !d.eaten).count()
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Player move followed by one ghost step. Walls reject the move.
    pub fn step_player<R: Rng>(&mut self, dir: Dir, ctx: &mut Ctx<'_, R>) -> Outcome {
        let dir = dir.resolve(ctx.controls_flipped);
        let max = IVec2::new(self.map.width() - 2, self.map.height() - 2);
        let target = clamp_cell(self.player + dir.offset(), IVec2::ONE, max);

        let mut outcome = Outcome::Continue;
        if target != self.player && !self.map.is_wall(target) {
            self.player = target;
            if let Some(dot) = self.dots.iter_mut().find(|d| !d.eaten && d.pos == target) {
                dot.eaten = true;
                ctx.award(ctx.tuning.dot_score);
                if !self.cleared && self.dots.iter().all(|d| d.eaten) {
                    self.cleared = true;
                    outcome = Outcome::Cleared;
                }
            }
        }

        if !self.cleared {
            let chance = ctx.tuning.ghost_turn_chance_move;
            self.step_ghosts(chance, ctx);
        }
        outcome
    }

    /// Step every ghost once; contact with the player costs points
    pub fn step_ghosts<R: Rng>(&mut self, turn_chance: f64, ctx: &mut Ctx<'_, R>) {
        for ghost in &mut self.ghosts {
            ghost.step(&self.map, turn_chance, &mut *ctx.rng);
        }
        if self.ghosts.iter().any(|g| g.pos == self.player) {
            ctx.penalize(ctx.tuning.ghost_hit_penalty);
        }
    }
}

/// Scatter dots over the reachable cells outside the spawn box
fn place_dots<R: Rng>(map: &MazeMap, rng: &mut R, tuning: &Tuning) -> Vec<Dot> {
    let ((x0, x1), (y0, y1)) = MAZE_DOT_EXCLUSION;
    let candidates: Vec<IVec2> = map
        .reachable()
        .iter()
        .copied()
        .filter(|p| !((x0..=x1).contains(&p.x) && (y0..=y1).contains(&p.y)))
        .collect();

    let mut dots: Vec<Dot> = Vec::new();
    for &pos in &candidates {
        if rng.random_bool(tuning.dot_chance) && dots.len() < tuning.dot_cap {
            dots.push(Dot { pos, eaten: false });
        }
    }

    if dots.len() < tuning.dot_min {
        for &pos in &candidates {
            if dots.len() >= tuning.dot_top_up {
                break;
            }
            if !dots.iter().any(|d| d.pos == pos) {
                dots.push(Dot { pos, eaten: false });
            }
        }
    }
    dots
}
