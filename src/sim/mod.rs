//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated clock only (see `schedule`)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod dodger;
pub mod grid;
pub mod maze;
pub mod sabotage;
pub mod schedule;
pub mod shooter;
pub mod state;

pub use collision::{HitReport, resolve_bullet_hits};
pub use dodger::{Coin, DodgerState};
pub use grid::{Dir, clamp_cell, first_step};
pub use maze::{Dot, Ghost, MazeMap, MazeState};
pub use sabotage::{Effect, Sabotage, SabotageState};
pub use schedule::{Scheduler, Scope, TaskId, TaskKind};
pub use shooter::{Enemy, EnemyKind, ShooterState};
pub use state::{Ctx, Engine, GameKind, Outcome};
