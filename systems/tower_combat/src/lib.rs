#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower firing system.
//!
//! Each tick the system recomputes synergy bonuses from scratch, then lets
//! every ready attack tower pick its targets and fire pooled bullets at them.

use glam::Vec2;
use ring_defence_core::{
    Bullet, BulletEffect, EffectKind, EnemyId, Event, Position, SynergyBonuses, TowerClass,
    TowerId,
};
use ring_defence_system_tower_targeting::{TargetQuery, TowerTargeting};
use ring_defence_world::{query, World};
use tracing::debug;

mod bonuses;

pub use bonuses::{cap_synergy, pair_bonus, position_bonus, FiringStats, SYNERGY_CAP};

#[derive(Clone, Copy, Debug)]
struct Peer {
    slot: usize,
    position: Position,
    class: TowerClass,
}

#[derive(Clone, Copy, Debug)]
struct Shot {
    slot: usize,
    tower: TowerId,
    origin: Position,
    size: f32,
    target: EnemyId,
    aim: Position,
    damage: f32,
    splash_radius: f32,
    type_index: usize,
}

/// Tower firing system that reuses scratch buffers between ticks.
#[derive(Debug, Default)]
pub struct TowerFiring {
    targeting: TowerTargeting,
    peers: Vec<Peer>,
    targets: Vec<usize>,
    shots: Vec<Shot>,
}

impl TowerFiring {
    /// Creates a new firing system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every ready attack tower that has a target in range.
    pub fn handle(&mut self, world: &mut World, out: &mut Vec<Event>) {
        self.refresh_synergy(world);
        self.plan_shots(world);
        if self.shots.is_empty() {
            return;
        }

        let now = world.now();
        let combat = world.config().combat;
        for shot in &self.shots {
            if let Some(tower) = world
                .slots_mut()
                .get_mut(shot.slot)
                .and_then(|slot| slot.tower.as_mut())
            {
                tower.last_fired = Some(now);
            }

            let spec = world.config().bullet_types.resolve(shot.type_index);
            let (speed_multiplier, effect, color) = (spec.speed_multiplier, spec.effect, spec.color);
            let direction = aim_direction(shot.origin, shot.aim);
            let bullet = Bullet {
                position: shot.origin,
                size: combat.bullet_size,
                speed: combat.bullet_speed * speed_multiplier,
                damage: shot.damage,
                direction,
                color,
                type_index: shot.type_index,
                effect,
                life: combat.bullet_life(),
                source: Some(shot.tower),
                splash_radius: shot.splash_radius,
                pierce_remaining: pierce_charges(effect),
                ..world.acquire_bullet()
            };
            let bullet_id = bullet.id;
            world.push_bullet(bullet);

            let muzzle = shot.origin.offset(direction * shot.size);
            let _ = world.add_effect(
                EffectKind::MuzzleFlash,
                muzzle,
                shot.size * 0.5,
                combat.muzzle_life(),
                color,
            );
            debug!(
                tower = shot.tower.get(),
                target = shot.target.get(),
                damage = shot.damage,
                "tower fired"
            );
            out.push(Event::TowerFired {
                tower: shot.tower,
                target: shot.target,
                bullet: bullet_id,
            });
        }
    }

    /// Recomputes the capped synergy bonuses of every tower.
    fn refresh_synergy(&mut self, world: &mut World) {
        let radius = world.config().towers.synergy_radius;
        self.peers.clear();
        for (slot, entry) in query::slots(world).iter().enumerate() {
            if let Some(class) = entry.tower.as_ref().and_then(|tower| tower.class) {
                self.peers.push(Peer {
                    slot,
                    position: entry.position,
                    class,
                });
            }
        }

        let radius_squared = radius * radius;
        for (slot, entry) in world.slots_mut().iter_mut().enumerate() {
            let Some(tower) = entry.tower.as_mut() else {
                continue;
            };
            let mut total = SynergyBonuses::default();
            if let Some(class) = tower.class {
                for peer in &self.peers {
                    if peer.slot == slot
                        || peer.position.distance_squared(entry.position) > radius_squared
                    {
                        continue;
                    }
                    total = total.combine(pair_bonus(class, peer.class));
                }
            }
            tower.synergy = cap_synergy(total);
        }
    }

    fn plan_shots(&mut self, world: &World) {
        self.shots.clear();
        let now = query::now(world);
        let enemies = query::enemies(world);
        if enemies.is_empty() {
            return;
        }
        let bullet_types = &query::config(world).bullet_types;

        for (slot, entry) in query::slots(world).iter().enumerate() {
            let Some(tower) = entry.tower.as_ref() else {
                continue;
            };
            if !tower.is_attacker() {
                continue;
            }
            let stats = FiringStats::for_tower(
                tower,
                entry.terrain,
                bullet_types.resolve(tower.bullet_type),
            );
            if !stats.is_ready(tower.last_fired, now) {
                continue;
            }

            let request = TargetQuery::for_tower(tower, stats.range_multiplier);
            self.targeting
                .select_many(&request, enemies, stats.projectiles, &mut self.targets);
            for &index in &self.targets {
                let enemy = &enemies[index];
                self.shots.push(Shot {
                    slot,
                    tower: tower.id,
                    origin: tower.position,
                    size: tower.size,
                    target: enemy.id,
                    aim: enemy.position,
                    damage: stats.damage,
                    splash_radius: stats.splash_radius,
                    type_index: tower.bullet_type,
                });
            }
        }
    }
}

fn aim_direction(origin: Position, aim: Position) -> Vec2 {
    let direction = (aim.to_vec2() - origin.to_vec2()).normalize_or_zero();
    if direction == Vec2::ZERO {
        Vec2::X
    } else {
        direction
    }
}

fn pierce_charges(effect: Option<BulletEffect>) -> u8 {
    match effect {
        Some(BulletEffect::Pierce { hits }) => hits,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aim_falls_back_to_x_axis_when_overlapping() {
        let origin = Position::new(5.0, 5.0);
        assert_eq!(aim_direction(origin, origin), Vec2::X);
        let direction = aim_direction(origin, Position::new(5.0, 15.0));
        assert!((direction - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn only_pierce_effects_grant_charges() {
        assert_eq!(pierce_charges(Some(BulletEffect::Pierce { hits: 2 })), 2);
        assert_eq!(pierce_charges(Some(BulletEffect::Freeze { duration_ms: 10 })), 0);
        assert_eq!(pierce_charges(None), 0);
    }
}
