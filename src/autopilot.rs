//! Scripted player for headless runs
//!
//! Looks at the active engine and picks the next key. Deterministic: the same
//! state always gives the same key. Flipped controls are pre-compensated, so
//! the bot still walks where it means to.

use glam::IVec2;

use crate::consts::DODGER_SIZE;
use crate::platform::Key;
use crate::sim::{DodgerState, Dir, Engine, MazeState, ShooterState, clamp_cell, first_step};
use crate::sim::collision::HIT_REACH;

/// Next key for the active game
pub fn choose_key(engine: &Engine, controls_flipped: bool) -> Key {
    let dir = match engine {
        Engine::Dodger(state) => dodger_step(state),
        Engine::Maze(state) => maze_step(state),
        Engine::Shooter(state) => return shooter_key(state, controls_flipped),
    };
    match dir {
        Some(dir) => Key::from_dir(dir.resolve(controls_flipped)),
        None => Key::Action,
    }
}

/// Shortest path to the nearest coin around the hazards, or straight at it
/// when the hazards wall it off
fn dodger_step(state: &DodgerState) -> Option<Dir> {
    let max = IVec2::splat(DODGER_SIZE - 1);
    let is_coin = |p: IVec2| state.coins.iter().any(|c| !c.collected && c.pos == p);
    let open = |p: IVec2| clamp_cell(p, IVec2::ZERO, max) == p && !state.enemies.contains(&p);

    first_step(state.player, open, is_coin).or_else(|| {
        let coin = state
            .coins
            .iter()
            .filter(|c| !c.collected)
            .min_by_key(|c| manhattan(state.player, c.pos))?;
        Dir::ALL
            .into_iter()
            .min_by_key(|d| manhattan(state.player + d.offset(), coin.pos))
    })
}

fn maze_step(state: &MazeState) -> Option<Dir> {
    let is_dot = |p: IVec2| state.dots.iter().any(|d| !d.eaten && d.pos == p);
    state.map().first_step_toward(state.player, is_dot)
}

/// Line up under the lowest enemy and shoot
fn shooter_key(state: &ShooterState, controls_flipped: bool) -> Key {
    let Some(target) = state.enemies.iter().max_by_key(|e| e.pos.y) else {
        return Key::Action;
    };
    let dx = target.pos.x - state.player_x;
    if dx.abs() <= HIT_REACH {
        return Key::Action;
    }
    let dir = if dx < 0 { Dir::Left } else { Dir::Right };
    Key::from_dir(dir.resolve(controls_flipped))
}

#[inline]
fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a - b).abs().element_sum()
}
