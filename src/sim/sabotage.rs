//! Random sabotage events
//!
//! From level 2 on, any input may trigger one of a fixed catalog of
//! disruptions. Only three of them actually change anything.

use rand::Rng;
use serde::Serialize;

use crate::tuning::Tuning;

/// What a sabotage event does to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    FlipControls,
    /// Flat deduction, floored at zero
    ScoreTax,
    /// Level score halved, rounded down
    HalveScore,
    /// Message only
    Cosmetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sabotage {
    pub message: &'static str,
    pub effect: Effect,
}

pub const CATALOG: [Sabotage; 12] = [
    Sabotage { message: "COSMIC RADIATION DETECTED - Level revoked!", effect: Effect::Cosmetic },
    Sabotage { message: "Your controls have been possessed by a ghost!", effect: Effect::Cosmetic },
    Sabotage { message: "Score tax imposed! -5 points!", effect: Effect::ScoreTax },
    Sabotage { message: "PHANTOM WALL appeared out of nowhere!", effect: Effect::Cosmetic },
    Sabotage { message: "SYSTEM ERROR 42: Reality glitching!", effect: Effect::Cosmetic },
    Sabotage { message: "A duck ate your progress! Quack!", effect: Effect::Cosmetic },
    Sabotage { message: "CONTROLS FLIPPED - Good luck!", effect: Effect::FlipControls },
    Sabotage { message: "SCORE MULTIPLIER: 0.5x (unlucky!)", effect: Effect::HalveScore },
    Sabotage { message: "Random teleport in 3... 2... 1...", effect: Effect::Cosmetic },
    Sabotage { message: "LEVEL CORRUPTION - Starting over!", effect: Effect::Cosmetic },
    Sabotage { message: "Time went backward! -10 seconds!", effect: Effect::Cosmetic },
    Sabotage { message: "GLITCH BOSS APPROACHING!", effect: Effect::Cosmetic },
];

/// Decide whether sabotage strikes after an input, and which one
pub fn roll<R: Rng>(level: u8, rng: &mut R, tuning: &Tuning) -> Option<&'static Sabotage> {
    if level < tuning.sabotage_min_level || !rng.random_bool(tuning.sabotage_chance) {
        return None;
    }
    Some(&CATALOG[rng.random_range(0..CATALOG.len())])
}

/// The currently displayed sabotage. At most one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SabotageState {
    pub message: Option<String>,
    pub controls_flipped: bool,
}

impl SabotageState {
    /// Apply an event, replacing whatever was showing. Controls stay flipped
    /// only while a flip is the event on screen.
    pub fn apply(&mut self, sabotage: &Sabotage, level_score: &mut u64, tuning: &Tuning) {
        match sabotage.effect {
            Effect::ScoreTax => *level_score = crate::deduct(*level_score, tuning.sabotage_tax),
            Effect::HalveScore => *level_score /= 2,
            Effect::FlipControls | Effect::Cosmetic => {}
        }
        self.controls_flipped = sabotage.effect == Effect::FlipControls;
        self.message = Some(sabotage.message.to_string());
        log::info!("Sabotage: {}", sabotage.message);
    }

    /// Timer ran out
    pub fn expire(&mut self) {
        self.message = None;
        self.controls_flipped = false;
    }

    pub fn is_active(&self) -> bool {
        self.message.is_some()
    }
}
