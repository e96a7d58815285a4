//! Bullet/enemy collision resolution for the shooter
//!
//! One pass per tick over post-move positions. Each bullet hits at most one
//! enemy, a dead enemy absorbs nothing further, and every enemy whose health
//! reaches zero is removed in the same pass and counted exactly once.

use glam::IVec2;

use super::shooter::Enemy;

/// Horizontal reach of a hit (bullet x within +-HIT_REACH of the enemy)
pub const HIT_REACH: i32 = 1;

/// Result of one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitReport {
    /// Bullets that connected
    pub hits: u32,
    /// Enemies destroyed
    pub kills: u32,
}

/// Does a bullet at `bullet` hit an enemy at `enemy`?
#[inline]
pub fn bullet_hits(bullet: IVec2, enemy: IVec2) -> bool {
    bullet.y == enemy.y && (bullet.x - enemy.x).abs() <= HIT_REACH
}

/// Apply player bullets to enemies, dropping spent bullets and dead enemies
pub fn resolve_bullet_hits(bullets: &mut Vec<IVec2>, enemies: &mut Vec<Enemy>) -> HitReport {
    let mut report = HitReport::default();

    bullets.retain(|&bullet| {
        let target = enemies
            .iter_mut()
            .find(|e| e.health > 0 && bullet_hits(bullet, e.pos));
        match target {
            Some(enemy) => {
                enemy.health -= 1;
                report.hits += 1;
                if enemy.health <= 0 {
                    report.kills += 1;
                }
                false
            }
            None => true,
        }
    });

    enemies.retain(|e| e.health > 0);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shooter::EnemyKind;

    fn enemy(x: i32, y: i32, kind: EnemyKind) -> Enemy {
        Enemy::new(IVec2::new(x, y), kind)
    }

    #[test]
    fn test_hit_window() {
        let e = IVec2::new(10, 5);
        assert!(bullet_hits(IVec2::new(9, 5), e));
        assert!(bullet_hits(IVec2::new(11, 5), e));
        assert!(!bullet_hits(IVec2::new(12, 5), e));
        assert!(!bullet_hits(IVec2::new(10, 4), e));
    }

    #[test]
    fn test_kill_counted_once() {
        let mut bullets = vec![IVec2::new(10, 5), IVec2::new(10, 5), IVec2::new(3, 3)];
        let mut enemies = vec![enemy(10, 5, EnemyKind::Asteroid)];
        let report = resolve_bullet_hits(&mut bullets, &mut enemies);
        assert_eq!(report, HitReport { hits: 1, kills: 1 });
        assert!(enemies.is_empty());
        // Second bullet found nothing alive to hit and flies on
        assert_eq!(bullets, vec![IVec2::new(10, 5), IVec2::new(3, 3)]);
    }

    #[test]
    fn test_boss_takes_three_hits() {
        let mut enemies = vec![enemy(10, 5, EnemyKind::Boss)];
        let mut bullets = vec![IVec2::new(9, 5), IVec2::new(11, 5)];
        let report = resolve_bullet_hits(&mut bullets, &mut enemies);
        assert_eq!(report, HitReport { hits: 2, kills: 0 });
        assert_eq!(enemies[0].health, 1);
        assert!(bullets.is_empty());

        let mut bullets = vec![IVec2::new(10, 5)];
        let report = resolve_bullet_hits(&mut bullets, &mut enemies);
        assert_eq!(report.kills, 1);
        assert!(enemies.is_empty());
    }

    #[test]
    fn test_one_bullet_one_enemy() {
        // Two enemies inside one bullet's reach: only the first is hit
        let mut enemies = vec![enemy(9, 5, EnemyKind::Asteroid), enemy(11, 5, EnemyKind::Asteroid)];
        let mut bullets = vec![IVec2::new(10, 5)];
        let report = resolve_bullet_hits(&mut bullets, &mut enemies);
        assert_eq!(report.kills, 1);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].pos, IVec2::new(11, 5));
    }
}
