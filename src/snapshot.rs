//! Read-only view of a session for a presentation layer
//!
//! Serializes to JSON so a renderer in any language can draw a frame
//! without touching session internals.

use serde::Serialize;

use crate::highscores::LeaderboardView;
use crate::session::{LevelComplete, Phase};
use crate::sim::{Engine, GameKind};

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub game: GameKind,
    pub game_title: &'static str,
    pub level: u8,
    pub level_score: u64,
    pub total_score: u64,
    pub player_name: String,
    pub controls_flipped: bool,
    pub sabotage_message: Option<String>,
    pub banner: Option<String>,
    pub level_complete: LevelComplete,
    /// Simulated time (ms)
    pub time_ms: u64,
    /// Active game's state. Absent outside Playing.
    pub engine: Option<Engine>,
    pub leaderboard: LeaderboardView,
}

impl Snapshot {
    /// Sabotage takes precedence over the transition banner
    pub fn headline(&self) -> Option<&str> {
        self.sabotage_message.as_deref().or(self.banner.as_deref())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
