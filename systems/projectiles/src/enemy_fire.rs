//! Ranged enemies and bosses shooting at towers.

use glam::Vec2;
use ring_defence_core::{Bullet, Color, Position};
use ring_defence_world::{query, World};
use tracing::debug;

const ENEMY_BULLET_SIZE: f32 = 5.0;

#[derive(Clone, Copy, Debug)]
struct Volley {
    enemy: usize,
    origin: Position,
    direction: Vec2,
    speed: f32,
    damage: f32,
    color: Color,
}

/// Lets armed enemies fire at the nearest tower within their weapon range.
#[derive(Debug, Default)]
pub struct EnemyFire {
    volleys: Vec<Volley>,
}

impl EnemyFire {
    /// Creates a new enemy fire system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every armed enemy whose cooldown elapsed and that has a tower
    /// within range. Frozen enemies hold their fire.
    pub fn handle(&mut self, world: &mut World) {
        self.plan(world);
        if self.volleys.is_empty() {
            return;
        }

        let now = world.now();
        let life = world.config().combat.bullet_life();
        for volley in &self.volleys {
            if let Some(enemy) = world.enemies_mut().get_mut(volley.enemy) {
                enemy.last_fired = Some(now);
            }
            let bullet = Bullet {
                position: volley.origin,
                size: ENEMY_BULLET_SIZE,
                speed: volley.speed,
                damage: volley.damage,
                direction: volley.direction,
                color: volley.color,
                life,
                ..world.acquire_bullet()
            };
            debug!(bullet = bullet.id.get(), damage = volley.damage, "enemy fired");
            world.push_enemy_bullet(bullet);
        }
    }

    fn plan(&mut self, world: &World) {
        self.volleys.clear();
        let now = query::now(world);
        for (index, enemy) in query::enemies(world).iter().enumerate() {
            if !enemy.is_alive() || enemy.is_frozen(now) {
                continue;
            }
            let Some(weapon) = enemy.weapon() else {
                continue;
            };
            let ready = enemy
                .last_fired
                .map_or(true, |last| now.saturating_sub(last) >= weapon.cooldown());
            if !ready {
                continue;
            }

            let range_squared = weapon.range * weapon.range;
            let mut nearest: Option<(f32, Position)> = None;
            for (_, tower) in query::towers(world) {
                let distance = tower.position.distance_squared(enemy.position);
                if distance > range_squared {
                    continue;
                }
                match nearest {
                    Some((best, _)) if distance >= best => {}
                    _ => nearest = Some((distance, tower.position)),
                }
            }
            let Some((_, target)) = nearest else {
                continue;
            };

            let direction = (target.to_vec2() - enemy.position.to_vec2()).normalize_or_zero();
            if direction == Vec2::ZERO {
                continue;
            }
            self.volleys.push(Volley {
                enemy: index,
                origin: enemy.position,
                direction,
                speed: weapon.projectile_speed,
                damage: weapon.damage,
                color: enemy.color,
            });
        }
    }
}
