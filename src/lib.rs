//! Arcade Gauntlet - three arcade games chained into one sabotaged session
//!
//! Core modules:
//! - `sim`: Deterministic simulation (dodger, maze chase, shooter, sabotage, timers)
//! - `session`: Session controller, event queue and level/game sequencing
//! - `highscores`: Leaderboard service with fallback recovery
//! - `persistence`: Leaderboard storage backends
//! - `platform`: Logical input keys
//! - `settings` / `tuning`: Configuration and data-driven game balance
//! - `snapshot`: Read-only render snapshot for a presentation layer
//! - `autopilot`: Scripted player for headless runs

pub mod autopilot;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use error::{SessionError, SettingsError, StorageError, ValidationError};
pub use highscores::{LeaderboardView, ScoreClient, ScoreEntry, ScoreService, ScoreSink};
pub use platform::Key;
pub use session::{Session, SessionEvent};
pub use settings::Settings;
pub use snapshot::Snapshot;
pub use tuning::Tuning;

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Levels per game
    pub const LEVELS_PER_GAME: u8 = 3;

    /// Dodger grid is DODGER_SIZE x DODGER_SIZE
    pub const DODGER_SIZE: i32 = 20;
    pub const DODGER_PLAYER_SPAWN: (i32, i32) = (10, 15);
    pub const DODGER_COINS: [(i32, i32); 5] = [(5, 10), (12, 3), (18, 12), (7, 17), (14, 8)];
    /// Enemy placement band (inclusive)
    pub const DODGER_ENEMY_X: (i32, i32) = (1, 18);
    pub const DODGER_ENEMY_Y: (i32, i32) = (1, 10);

    /// Maze layout, `#` is a wall
    pub const MAZE_LAYOUT: [&str; 15] = [
        "################################",
        "#..............................#",
        "#.####.######.##..##.######.##.#",
        "#.####.######.##..##.######.##.#",
        "#..............................#",
        "#.####.##.######....##.##.####.#",
        "#......##....##......##........#",
        "######.####.##.####.########.###",
        "#..............................#",
        "#.########.##.####.##.########.#",
        "#........##..#..#..##..........#",
        "#.######.##..#..#..##.######.#.#",
        "#.#....#.##........##....#....#.",
        "#...####.############.####....#.",
        "################################",
    ];
    pub const MAZE_WIDTH: i32 = 32;
    pub const MAZE_HEIGHT: i32 = 15;
    pub const MAZE_SPAWN: (i32, i32) = (1, 1);
    /// No dots inside this box around the spawn (inclusive x range, inclusive y range)
    pub const MAZE_DOT_EXCLUSION: ((i32, i32), (i32, i32)) = ((1, 3), (1, 2));
    pub const MAZE_GHOST_SPAWNS: [(i32, i32); 5] = [(15, 6), (16, 6), (1, 13), (30, 13), (15, 1)];

    /// Shooter field
    pub const SHOOTER_WIDTH: i32 = 30;
    pub const SHOOTER_HEIGHT: i32 = 25;
    pub const SHOOTER_PLAYER_MIN_X: i32 = 2;
    pub const SHOOTER_PLAYER_MAX_X: i32 = 27;
    pub const SHOOTER_PLAYER_START_X: i32 = 15;
    /// Row where player bullets appear
    pub const SHOOTER_MUZZLE_Y: i32 = 22;
    /// Enemies at or past this row breach the defence line
    pub const SHOOTER_BREACH_Y: i32 = 23;
    /// Enemy bullets at or past this row can strike the player
    pub const SHOOTER_STRIKE_Y: i32 = 22;
    /// Enemies drifting outside this x band are discarded
    pub const SHOOTER_ENEMY_MIN_X: i32 = 1;
    pub const SHOOTER_ENEMY_MAX_X: i32 = 28;
    pub const SHOOTER_INITIAL_ASTEROIDS: usize = 3;
}

/// Convert a constant `(x, y)` pair to a cell
#[inline]
pub const fn cell(xy: (i32, i32)) -> IVec2 {
    IVec2::new(xy.0, xy.1)
}

/// Subtract `amount` from a score, never dropping below zero
#[inline]
pub fn deduct(score: u64, amount: u64) -> u64 {
    score.saturating_sub(amount)
}
