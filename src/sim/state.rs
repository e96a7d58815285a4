//! Shared simulation types and the per-game engine union

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::dodger::DodgerState;
use super::maze::{MazeMap, MazeState};
use super::schedule::TaskKind;
use super::shooter::ShooterState;
use crate::platform::Key;
use crate::tuning::Tuning;

/// The three acts, played in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Dodger,
    Maze,
    Shooter,
}

impl GameKind {
    /// Next act, or None after the shooter
    pub fn next(self) -> Option<GameKind> {
        match self {
            GameKind::Dodger => Some(GameKind::Maze),
            GameKind::Maze => Some(GameKind::Shooter),
            GameKind::Shooter => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Dodger => "DODGER",
            GameKind::Maze => "MAZE CHASE BUT CONFUSED",
            GameKind::Shooter => "SPACE SHOOTER OF DOOM",
        }
    }
}

/// What an engine reports back after handling an input or timer
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Win condition met. Reported at most once per level.
    Cleared,
}

/// Everything an engine may touch besides its own state
pub struct Ctx<'a, R: Rng> {
    pub rng: &'a mut R,
    pub tuning: &'a Tuning,
    /// The session's level score
    pub score: &'a mut u64,
    pub controls_flipped: bool,
}

impl<R: Rng> Ctx<'_, R> {
    #[inline]
    pub fn award(&mut self, points: u64) {
        *self.score += points;
    }

    /// Deduct points, floored at zero
    #[inline]
    pub fn penalize(&mut self, points: u64) {
        *self.score = crate::deduct(*self.score, points);
    }
}

/// State of whichever game is active
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "game", content = "state")]
pub enum Engine {
    Dodger(DodgerState),
    Maze(MazeState),
    Shooter(ShooterState),
}

impl Engine {
    /// Fresh engine for a game and level
    pub fn new<R: Rng>(
        kind: GameKind,
        level: u8,
        rng: &mut R,
        tuning: &Tuning,
        maze: &Arc<MazeMap>,
    ) -> Self {
        match kind {
            GameKind::Dodger => Engine::Dodger(DodgerState::new(level, rng, tuning)),
            GameKind::Maze => Engine::Maze(MazeState::new(Arc::clone(maze), level, rng, tuning)),
            GameKind::Shooter => Engine::Shooter(ShooterState::new(level, rng)),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            Engine::Dodger(_) => GameKind::Dodger,
            Engine::Maze(_) => GameKind::Maze,
            Engine::Shooter(_) => GameKind::Shooter,
        }
    }

    /// Route a key to the active game
    pub fn handle_key<R: Rng>(&mut self, key: Key, ctx: &mut Ctx<'_, R>) -> Outcome {
        match self {
            Engine::Dodger(state) => match key.dir() {
                Some(dir) => state.step(dir, ctx),
                None => Outcome::Continue,
            },
            Engine::Maze(state) => match key.dir() {
                Some(dir) => state.step_player(dir, ctx),
                None => Outcome::Continue,
            },
            Engine::Shooter(state) => match key {
                Key::Left | Key::Right => {
                    if let Some(dir) = key.dir() {
                        state.move_player(dir, ctx);
                    }
                    Outcome::Continue
                }
                Key::Up | Key::Action => {
                    state.fire(ctx);
                    Outcome::Continue
                }
                Key::Down => Outcome::Continue,
            },
        }
    }

    /// Run a timer task owned by the active game
    pub fn on_timer<R: Rng>(&mut self, task: TaskKind, ctx: &mut Ctx<'_, R>) -> Outcome {
        match (self, task) {
            (Engine::Maze(state), TaskKind::GhostStep) => {
                let chance = ctx.tuning.ghost_turn_chance_timer;
                state.step_ghosts(chance, ctx);
                Outcome::Continue
            }
            (Engine::Shooter(state), TaskKind::ShooterTick) => state.tick(ctx),
            (Engine::Shooter(state), TaskKind::ShooterSpawn) => {
                state.spawn(ctx);
                Outcome::Continue
            }
            (Engine::Shooter(state), TaskKind::EnemyFire) => {
                state.enemy_fire(ctx);
                Outcome::Continue
            }
            (engine, task) => {
                log::debug!("{:?} ignores stale task {:?}", engine.kind(), task);
                Outcome::Continue
            }
        }
    }

    /// Periodic tasks this engine needs while its level runs
    pub fn timers(&self, tuning: &Tuning) -> Vec<(TaskKind, u64)> {
        match self {
            Engine::Dodger(_) => Vec::new(),
            Engine::Maze(state) => vec![(TaskKind::GhostStep, state.ghost_period_ms)],
            Engine::Shooter(state) => {
                let mut timers = vec![
                    (TaskKind::ShooterTick, tuning.shooter_tick_ms),
                    (TaskKind::ShooterSpawn, tuning.spawn_period_ms(state.level)),
                ];
                if state.level >= tuning.enemy_fire_min_level {
                    timers.push((TaskKind::EnemyFire, tuning.enemy_fire_period_ms));
                }
                timers
            }
        }
    }
}
