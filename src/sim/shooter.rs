//! Vertical shooter: enemies fall, the player shoots upward
//!
//! Driven by three independent timers: the simulation tick, the spawner and
//! (from level 2) enemy fire.

use glam::IVec2;
use rand::Rng;
use serde::Serialize;

use super::collision::resolve_bullet_hits;
use super::grid::Dir;
use super::state::{Ctx, Outcome};
use crate::consts::*;

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnemyKind {
    Asteroid,
    /// Drifts sideways and shoots
    Alien,
    /// Tough and shoots
    Boss,
}

impl EnemyKind {
    pub fn initial_health(self) -> i32 {
        match self {
            EnemyKind::Asteroid => 1,
            EnemyKind::Alien => 2,
            EnemyKind::Boss => 3,
        }
    }

    pub fn fires(self) -> bool {
        self != EnemyKind::Asteroid
    }

    /// Level-dependent spawn mix
    pub fn roll<R: Rng>(level: u8, rng: &mut R) -> Self {
        let roll: f64 = rng.random();
        match level {
            0 | 1 => EnemyKind::Asteroid,
            2 => {
                if roll < 0.6 {
                    EnemyKind::Asteroid
                } else {
                    EnemyKind::Alien
                }
            }
            _ => {
                if roll < 0.4 {
                    EnemyKind::Asteroid
                } else if roll < 0.7 {
                    EnemyKind::Alien
                } else {
                    EnemyKind::Boss
                }
            }
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enemy {
    pub pos: IVec2,
    pub kind: EnemyKind,
    /// At least 1 while the enemy is in play
    pub health: i32,
}

impl Enemy {
    pub fn new(pos: IVec2, kind: EnemyKind) -> Self {
        Self {
            pos,
            kind,
            health: kind.initial_health(),
        }
    }
}

/// Shooter level state
#[derive(Debug, Clone, Serialize)]
pub struct ShooterState {
    pub level: u8,
    pub player_x: i32,
    pub bullets: Vec<IVec2>,
    pub enemies: Vec<Enemy>,
    pub enemy_bullets: Vec<IVec2>,
    pub kills: u32,
    cleared: bool,
}

impl ShooterState {
    /// New level, seeded with a few asteroids already on their way down
    pub fn new<R: Rng>(level: u8, rng: &mut R) -> Self {
        let enemies = (0..SHOOTER_INITIAL_ASTEROIDS)
            .map(|_| {
                let pos = IVec2::new(
                    rng.random_range(SHOOTER_PLAYER_MIN_X..=SHOOTER_PLAYER_MAX_X),
                    rng.random_range(0..5),
                );
                Enemy::new(pos, EnemyKind::Asteroid)
            })
            .collect();
        Self::with_enemies(level, enemies)
    }

    /// Level with an explicit enemy list and nothing else in flight
    pub fn with_enemies(level: u8, enemies: Vec<Enemy>) -> Self {
        Self {
            level,
            player_x: SHOOTER_PLAYER_START_X,
            bullets: Vec::new(),
            enemies,
            enemy_bullets: Vec::new(),
            kills: 0,
            cleared: false,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Slide left/right; flipped controls reflect the step
    pub fn move_player<R: Rng>(&mut self, dir: Dir, ctx: &mut Ctx<'_, R>) {
        let dx = dir.resolve(ctx.controls_flipped).offset().x;
        self.player_x = (self.player_x + dx).clamp(SHOOTER_PLAYER_MIN_X, SHOOTER_PLAYER_MAX_X);
    }

    /// Fire from the muzzle. No cooldown: one bullet per input.
    pub fn fire<R: Rng>(&mut self, ctx: &mut Ctx<'_, R>) {
        self.bullets.push(IVec2::new(self.player_x, SHOOTER_MUZZLE_Y));
        ctx.award(ctx.tuning.shot_score);
    }

    /// One simulation tick
    pub fn tick<R: Rng>(&mut self, ctx: &mut Ctx<'_, R>) -> Outcome {
        // Player bullets climb
        for b in &mut self.bullets {
            b.y -= 1;
        }
        self.bullets.retain(|b| b.y >= 0);

        // Enemies fall, aliens drift
        for e in &mut self.enemies {
            e.pos.y += 1;
            if e.kind == EnemyKind::Alien {
                e.pos.x += if ctx.rng.random_bool(0.5) { -1 } else { 1 };
            }
        }
        self.enemies
            .retain(|e| (SHOOTER_ENEMY_MIN_X..=SHOOTER_ENEMY_MAX_X).contains(&e.pos.x));

        let before = self.enemies.len();
        self.enemies.retain(|e| e.pos.y < SHOOTER_BREACH_Y);
        let breached = (before - self.enemies.len()) as u64;
        if breached > 0 {
            ctx.penalize(ctx.tuning.breach_penalty * breached);
        }

        // Enemy bullets fall
        for b in &mut self.enemy_bullets {
            b.y += 1;
        }
        self.enemy_bullets.retain(|b| b.y < SHOOTER_HEIGHT);

        let report = resolve_bullet_hits(&mut self.bullets, &mut self.enemies);
        if report.kills > 0 {
            self.kills += report.kills;
            ctx.award(ctx.tuning.kill_score * report.kills as u64);
        }

        // Player struck
        let player_x = self.player_x;
        let before = self.enemy_bullets.len();
        self.enemy_bullets
            .retain(|b| !(b.y >= SHOOTER_STRIKE_Y && b.x == player_x));
        let struck = (before - self.enemy_bullets.len()) as u64;
        if struck > 0 {
            ctx.penalize(ctx.tuning.struck_penalty * struck);
        }

        if !self.cleared && self.kills >= ctx.tuning.kills_to_win(self.level) {
            self.cleared = true;
            return Outcome::Cleared;
        }
        Outcome::Continue
    }

    /// Spawner timer: add one enemy at the top if there is room
    pub fn spawn<R: Rng>(&mut self, ctx: &mut Ctx<'_, R>) {
        if self.enemies.len() >= ctx.tuning.max_enemies(self.level) {
            return;
        }
        let kind = EnemyKind::roll(self.level, &mut *ctx.rng);
        let x = ctx
            .rng
            .random_range(SHOOTER_PLAYER_MIN_X..=SHOOTER_PLAYER_MAX_X);
        self.enemies.push(Enemy::new(IVec2::new(x, 0), kind));
    }

    /// Enemy fire timer: each shooter-type enemy may drop a bullet
    pub fn enemy_fire<R: Rng>(&mut self, ctx: &mut Ctx<'_, R>) {
        let chance = ctx.tuning.enemy_fire_chance;
        for e in &self.enemies {
            if e.kind.fires() && ctx.rng.random_bool(chance) {
                self.enemy_bullets.push(e.pos + IVec2::Y);
            }
        }
    }
}
