#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile systems: tower bullets against enemies, enemy weapons, and
//! enemy bullets against towers.
//!
//! Collision is resolved before expiry, so a bullet that both reaches its
//! target and runs out of life during the same tick still lands its hit.

use std::time::Duration;

use ring_defence_core::{Bullet, SimulationConfig};
use ring_defence_system_collision::Mover;

mod bullets;
mod enemy_fire;
mod enemy_projectiles;

pub use bullets::{BulletUpdate, SPLASH_DAMAGE_RATIO};
pub use enemy_fire::EnemyFire;
pub use enemy_projectiles::EnemyProjectiles;

/// Moves a bullet that did not collide and reports whether it is still live.
///
/// Bullets expire when their life reaches zero or when they leave the arena
/// plus its out-of-bounds margin.
pub(crate) fn advance(bullet: &mut Bullet, dt: Duration, config: &SimulationConfig) -> bool {
    let displacement = Mover::from_bullet(bullet).displacement(dt);
    bullet.position = bullet.position.offset(displacement);
    bullet.life = bullet.life.saturating_sub(dt);

    let bound = config.arena.radius + config.arena.out_of_bounds_margin;
    !bullet.life.is_zero() && bullet.position.distance_from_origin() <= bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use ring_defence_core::Position;

    fn bullet(x: f32, life_ms: u64) -> Bullet {
        Bullet {
            position: Position::new(x, 0.0),
            direction: Vec2::X,
            speed: 100.0,
            size: 4.0,
            life: Duration::from_millis(life_ms),
            ..Bullet::default()
        }
    }

    #[test]
    fn advancing_moves_by_speed_and_time() {
        let mut bullet = bullet(0.0, 1_000);
        assert!(advance(&mut bullet, Duration::from_millis(500), &SimulationConfig::default()));
        assert!((bullet.position.x - 50.0).abs() < 1e-4);
        assert_eq!(bullet.life, Duration::from_millis(500));
    }

    #[test]
    fn bullets_expire_with_their_life() {
        let mut bullet = bullet(0.0, 100);
        assert!(!advance(&mut bullet, Duration::from_millis(100), &SimulationConfig::default()));
    }

    #[test]
    fn bullets_expire_outside_the_playfield() {
        let mut bullet = bullet(555.0, 10_000);
        assert!(!advance(&mut bullet, Duration::from_millis(100), &SimulationConfig::default()));
    }
}
