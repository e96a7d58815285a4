//! Data-driven game balance
//!
//! Every probability, period and score delta used by the simulation. Loaded
//! as part of [`crate::Settings`]; missing fields take the defaults below.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Sabotage ===
    /// Chance per input of a sabotage event
    pub sabotage_chance: f64,
    /// Sabotage only fires from this level on
    pub sabotage_min_level: u8,
    /// How long a sabotage message (and flipped controls) lasts
    pub sabotage_duration_ms: u64,
    pub sabotage_tax: u64,
    /// Banner messages on level/game transitions
    pub banner_duration_ms: u64,

    // === Dodger ===
    pub coin_score: u64,
    pub dodger_hit_penalty: u64,

    // === Maze ===
    pub dot_score: u64,
    pub ghost_hit_penalty: u64,
    /// Per-cell chance of holding a dot
    pub dot_chance: f64,
    pub dot_cap: usize,
    /// Below this many dots the level is topped up...
    pub dot_min: usize,
    /// ...until it holds this many
    pub dot_top_up: usize,
    /// Chance a ghost picks a new facing on its background step
    pub ghost_turn_chance_timer: f64,
    /// Chance a ghost picks a new facing on the step following a player move
    pub ghost_turn_chance_move: f64,
    pub ghost_period_ms: u64,
    /// Random extra period, drawn once per level in `[0, jitter)`
    pub ghost_period_jitter_ms: u64,

    // === Shooter ===
    pub shooter_tick_ms: u64,
    pub spawn_period_base_ms: u64,
    pub spawn_period_per_level_ms: u64,
    pub enemy_fire_period_ms: u64,
    pub enemy_fire_chance: f64,
    pub enemy_fire_min_level: u8,
    pub shot_score: u64,
    pub kill_score: u64,
    pub breach_penalty: u64,
    pub struck_penalty: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            sabotage_chance: 0.3,
            sabotage_min_level: 2,
            sabotage_duration_ms: 3000,
            sabotage_tax: 5,
            banner_duration_ms: 3000,

            coin_score: 100,
            dodger_hit_penalty: 50,

            dot_score: 50,
            ghost_hit_penalty: 100,
            dot_chance: 0.12,
            dot_cap: 60,
            dot_min: 15,
            dot_top_up: 30,
            ghost_turn_chance_timer: 0.25,
            ghost_turn_chance_move: 0.30,
            ghost_period_ms: 400,
            ghost_period_jitter_ms: 200,

            shooter_tick_ms: 150,
            spawn_period_base_ms: 1500,
            spawn_period_per_level_ms: 300,
            enemy_fire_period_ms: 2000,
            enemy_fire_chance: 0.3,
            enemy_fire_min_level: 2,
            shot_score: 5,
            kill_score: 100,
            breach_penalty: 50,
            struck_penalty: 100,
        }
    }
}

impl Tuning {
    /// Force every probability into `[0, 1]`. NaN takes the default.
    pub fn sanitize(&mut self) {
        let defaults = Tuning::default();
        let chances = [
            ("sabotage_chance", &mut self.sabotage_chance, defaults.sabotage_chance),
            ("dot_chance", &mut self.dot_chance, defaults.dot_chance),
            ("ghost_turn_chance_timer", &mut self.ghost_turn_chance_timer, defaults.ghost_turn_chance_timer),
            ("ghost_turn_chance_move", &mut self.ghost_turn_chance_move, defaults.ghost_turn_chance_move),
            ("enemy_fire_chance", &mut self.enemy_fire_chance, defaults.enemy_fire_chance),
        ];
        for (name, value, default) in chances {
            let fixed = if value.is_nan() { default } else { value.clamp(0.0, 1.0) };
            if fixed != *value {
                log::warn!("Tuning {} = {} is not a probability, using {}", name, value, fixed);
                *value = fixed;
            }
        }
    }

    /// Spawn timer period for a shooter level
    pub fn spawn_period_ms(&self, level: u8) -> u64 {
        self.spawn_period_base_ms
            .saturating_sub(self.spawn_period_per_level_ms * level as u64)
            .max(1)
    }

    /// Kills needed to clear a shooter level (20, 25, 30)
    pub fn kills_to_win(&self, level: u8) -> u32 {
        15 + 5 * level as u32
    }

    /// Maximum simultaneous shooter enemies
    pub fn max_enemies(&self, level: u8) -> usize {
        5 + 2 * level as usize
    }

    /// Dodger enemy count (5, 7, 9)
    pub fn dodger_enemies(&self, level: u8) -> usize {
        3 + 2 * level as usize
    }

    /// Maze ghost count, capped by the number of spawn slots
    pub fn ghost_count(&self, level: u8, slots: usize) -> usize {
        (2 + level as usize).min(slots)
    }
}
