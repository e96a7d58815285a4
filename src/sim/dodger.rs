//! Grid dodger: walk a 20x20 grid, grab the coins, stay off the hazards

use glam::IVec2;
use rand::Rng;
use serde::Serialize;

use super::grid::{Dir, clamp_cell};
use super::state::{Ctx, Outcome};
use crate::cell;
use crate::consts::*;
use crate::tuning::Tuning;

/// A coin pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coin {
    pub pos: IVec2,
    /// Only ever goes false -> true
    pub collected: bool,
}

/// Dodger level state
#[derive(Debug, Clone, Serialize)]
pub struct DodgerState {
    pub level: u8,
    pub player: IVec2,
    /// Static hazards, distinct cells, never on a coin or the spawn
    pub enemies: Vec<IVec2>,
    pub coins: Vec<Coin>,
    /// Set once the last coin is taken
    cleared: bool,
}

impl DodgerState {
    /// Lay out a level: fixed coins, `3 + 2 * level` random hazards
    pub fn new<R: Rng>(level: u8, rng: &mut R, tuning: &Tuning) -> Self {
        let coins: Vec<Coin> = DODGER_COINS
            .iter()
            .map(|&xy| Coin {
                pos: cell(xy),
                collected: false,
            })
            .collect();
        let player = cell(DODGER_PLAYER_SPAWN);

        let count = tuning.dodger_enemies(level);
        let mut enemies = Vec::with_capacity(count);
        while enemies.len() < count {
            let pos = IVec2::new(
                rng.random_range(DODGER_ENEMY_X.0..=DODGER_ENEMY_X.1),
                rng.random_range(DODGER_ENEMY_Y.0..=DODGER_ENEMY_Y.1),
            );
            let blocked = pos == player
                || enemies.contains(&pos)
                || coins.iter().any(|c| c.pos == pos);
            if !blocked {
                enemies.push(pos);
            }
        }

        log::debug!("Dodger level {}: {} hazards", level, enemies.len());

        Self {
            level,
            player,
            enemies,
            coins,
            cleared: false,
        }
    }

    /// Build a level from explicit positions
    pub fn with_layout(level: u8, player: IVec2, enemies: Vec<IVec2>, coins: &[IVec2]) -> Self {
        Self {
            level,
            player,
            enemies,
            coins: coins
                .iter()
                .map(|&pos| Coin {
                    pos,
                    collected: false,
                })
                .collect(),
            cleared: false,
        }
    }

    pub fn coins_left(&self) -> usize {
        self.coins.iter().filter(|c| !c.collected).count()
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Move one cell. Flipped controls invert the step before clamping.
    pub fn step<R: Rng>(&mut self, dir: Dir, ctx: &mut Ctx<'_, R>) -> Outcome {
        let dir = dir.resolve(ctx.controls_flipped);
        let max = IVec2::splat(DODGER_SIZE - 1);
        let target = clamp_cell(self.player + dir.offset(), IVec2::ZERO, max);
        if target == self.player {
            return Outcome::Continue;
        }
        self.player = target;

        let mut outcome = Outcome::Continue;
        if let Some(coin) = self
            .coins
            .iter_mut()
            .find(|c| !c.collected && c.pos == target)
        {
            coin.collected = true;
            ctx.award(ctx.tuning.coin_score);
            if !self.cleared && self.coins.iter().all(|c| c.collected) {
                self.cleared = true;
                outcome = Outcome::Cleared;
            }
        }

        if self.enemies.contains(&target) {
            ctx.penalize(ctx.tuning.dodger_hit_penalty);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run(state: &mut DodgerState, dirs: &[Dir], score: &mut u64, flipped: bool) -> Vec<Outcome> {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(0);
        let mut ctx = Ctx {
            rng: &mut rng,
            tuning: &tuning,
            score,
            controls_flipped: flipped,
        };
        dirs.iter().map(|&d| state.step(d, &mut ctx)).collect()
    }

    #[test]
    fn test_new_level_layout() {
        let tuning = Tuning::default();
        for level in 1..=3 {
            let mut rng = Pcg32::seed_from_u64(level as u64);
            let state = DodgerState::new(level, &mut rng, &tuning);
            assert_eq!(state.enemies.len(), 3 + 2 * level as usize);
            assert_eq!(state.coins.len(), 5);
            assert_eq!(state.player, IVec2::new(10, 15));
            for e in &state.enemies {
                assert!((1..=18).contains(&e.x) && (1..=10).contains(&e.y));
                assert!(state.coins.iter().all(|c| c.pos != *e));
            }
        }
    }

    #[test]
    fn test_collect_all_coins_scores_500_once() {
        // Coins along a row, hazards elsewhere
        let enemies = vec![
            IVec2::new(1, 1),
            IVec2::new(2, 2),
            IVec2::new(3, 3),
            IVec2::new(4, 4),
            IVec2::new(5, 5),
        ];
        let coins = [
            IVec2::new(11, 15),
            IVec2::new(12, 15),
            IVec2::new(13, 15),
            IVec2::new(14, 15),
            IVec2::new(15, 15),
        ];
        let mut state = DodgerState::with_layout(1, IVec2::new(10, 15), enemies, &coins);
        let mut score = 0;

        let outcomes = run(&mut state, &[Dir::Right; 7], &mut score, false);
        assert_eq!(score, 500);
        let cleared = outcomes.iter().filter(|o| **o == Outcome::Cleared).count();
        assert_eq!(cleared, 1);
        assert_eq!(outcomes[4], Outcome::Cleared);
        assert!(state.is_cleared());

        // Walking back over collected cells never re-triggers
        let again = run(&mut state, &[Dir::Left; 6], &mut score, false);
        assert!(again.iter().all(|o| *o == Outcome::Continue));
        assert_eq!(score, 500);
    }

    #[test]
    fn test_hazard_penalty_floors_at_zero() {
        let mut state =
            DodgerState::with_layout(1, IVec2::new(5, 5), vec![IVec2::new(6, 5)], &[IVec2::new(0, 0)]);
        let mut score = 20;
        let _ = run(&mut state, &[Dir::Right], &mut score, false);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_flipped_controls_and_clamp() {
        let mut state = DodgerState::with_layout(1, IVec2::new(0, 0), vec![], &[IVec2::new(9, 9)]);
        let mut score = 0;
        // Flipped: Left walks right
        let _ = run(&mut state, &[Dir::Left], &mut score, true);
        assert_eq!(state.player, IVec2::new(1, 0));
        // Unflipped: Up at the top edge is clamped, no move
        let _ = run(&mut state, &[Dir::Up], &mut score, false);
        assert_eq!(state.player, IVec2::new(1, 0));
        let _ = run(&mut state, &[Dir::Left, Dir::Left], &mut score, false);
        assert_eq!(state.player, IVec2::ZERO);
    }
}
