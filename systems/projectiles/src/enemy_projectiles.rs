//! Enemy bullets against tower circles.

use std::time::Duration;

use ring_defence_core::{Bullet, EffectKind, Event};
use ring_defence_system_collision::{swept_circle, Circle, Contact, Mover};
use ring_defence_world::{query, World};

use crate::advance;

#[derive(Clone, Copy, Debug)]
struct TowerHit {
    slot: usize,
    contact: Contact,
}

/// Moves enemy bullets and applies their damage to towers.
#[derive(Debug, Default)]
pub struct EnemyProjectiles {
    survivors: Vec<Bullet>,
}

impl EnemyProjectiles {
    /// Creates a new enemy projectile system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every enemy bullet by `dt`. A bullet damages the first tower
    /// it touches and is released; enemy bullets carry no special effects.
    pub fn handle(&mut self, world: &mut World, dt: Duration, out: &mut Vec<Event>) {
        let bullets = world.take_enemy_bullets();
        self.survivors.clear();
        self.survivors.reserve(bullets.len());

        for mut bullet in bullets {
            if let Some(hit) = first_tower_hit(world, &bullet, dt) {
                let _ = world.damage_tower(hit.slot, bullet.damage, out);
                let hit_life = query::config(world).combat.hit_life();
                let _ = world.add_effect(
                    EffectKind::Hit,
                    hit.contact.point,
                    bullet.size * 2.0,
                    hit_life,
                    bullet.color,
                );
                world.remove_bullet(bullet);
                continue;
            }

            if advance(&mut bullet, dt, query::config(world)) {
                self.survivors.push(bullet);
            } else {
                world.remove_bullet(bullet);
            }
        }

        for bullet in self.survivors.drain(..) {
            world.push_enemy_bullet(bullet);
        }
    }
}

fn first_tower_hit(world: &World, bullet: &Bullet, dt: Duration) -> Option<TowerHit> {
    let mover = Mover::from_bullet(bullet);
    let mut best: Option<TowerHit> = None;
    for (slot, entry) in query::slots(world).iter().enumerate() {
        let Some(tower) = entry.tower.as_ref() else {
            continue;
        };
        let target = Circle {
            centre: tower.position,
            radius: tower.size,
        };
        let Some(contact) = swept_circle(&mover, &target, dt) else {
            continue;
        };
        match best {
            Some(existing) if contact.time >= existing.contact.time => {}
            _ => best = Some(TowerHit { slot, contact }),
        }
    }
    best
}
