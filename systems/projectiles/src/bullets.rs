//! Tower bullet update: swept collision, on-hit effects, and expiry.

use std::time::Duration;

use ring_defence_core::{
    Bullet, BulletEffect, Color, DamageOverTime, DotKind, EffectKind, Enemy, Event, Position,
    SlowStatus,
};
use ring_defence_system_collision::{CollisionDetector, Hit, Mover};
use ring_defence_world::{query, World};
use tracing::debug;

use crate::advance;

/// Fraction of the bullet damage dealt to enemies caught in a splash.
pub const SPLASH_DAMAGE_RATIO: f32 = 0.5;

const FROST_COLOR: Color = Color::from_rgb(0xb3, 0xe5, 0xfc);
const ARC_COLOR: Color = Color::from_rgb(0xb3, 0x88, 0xff);
const EXPLOSION_COLOR: Color = Color::from_rgb(0xff, 0x70, 0x43);
const EFFECT_LIFE: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug)]
struct ChainSpec {
    radius: f32,
    max_jumps: u8,
    falloff: f32,
}

/// Moves tower bullets and resolves their impacts.
#[derive(Debug, Default)]
pub struct BulletUpdate {
    survivors: Vec<Bullet>,
    nearby: Vec<usize>,
}

impl BulletUpdate {
    /// Creates a new bullet system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every live tower bullet by `dt`.
    ///
    /// `detector` must have been rebuilt from the enemies of this tick.
    pub fn handle(
        &mut self,
        world: &mut World,
        detector: &mut CollisionDetector,
        dt: Duration,
        out: &mut Vec<Event>,
    ) {
        let bullets = world.take_bullets();
        self.survivors.clear();
        self.survivors.reserve(bullets.len());

        'bullets: for mut bullet in bullets {
            let mut remaining = dt;
            while let Some(hit) =
                detector.first_hit(&bullet, query::enemies(world), remaining, &bullet.struck)
            {
                self.resolve_hit(world, detector, &bullet, &hit, out);
                if bullet.pierce_remaining == 0 {
                    world.remove_bullet(bullet);
                    continue 'bullets;
                }
                bullet.pierce_remaining -= 1;
                bullet.struck.push(hit.enemy);

                // carry on from the contact for the rest of the tick
                let travelled = remaining.mul_f32(hit.contact.time.clamp(0.0, 1.0));
                let displacement = Mover::from_bullet(&bullet).displacement(travelled);
                bullet.position = bullet.position.offset(displacement);
                bullet.life = bullet.life.saturating_sub(travelled);
                remaining = remaining.saturating_sub(travelled);
            }

            if advance(&mut bullet, remaining, query::config(world)) {
                self.survivors.push(bullet);
            } else {
                world.remove_bullet(bullet);
            }
        }

        for bullet in self.survivors.drain(..) {
            world.push_bullet(bullet);
        }
    }

    fn resolve_hit(
        &mut self,
        world: &mut World,
        detector: &mut CollisionDetector,
        bullet: &Bullet,
        hit: &Hit,
        out: &mut Vec<Event>,
    ) {
        let report = world.damage_enemy(hit.index, bullet.damage, out);
        debug!(
            enemy = hit.enemy.get(),
            damage = bullet.damage,
            killed = report.killed,
            "bullet hit"
        );

        if let Some(effect) = bullet.effect {
            self.apply_effect(world, detector, bullet, hit, effect, out);
        }

        if bullet.splash_radius > 0.0 {
            self.splash(world, detector, bullet, hit, out);
        }

        let hit_life = query::config(world).combat.hit_life();
        let _ = world.add_effect(
            EffectKind::Hit,
            hit.contact.point,
            bullet.size * 3.0,
            hit_life,
            bullet.color,
        );
    }

    fn apply_effect(
        &mut self,
        world: &mut World,
        detector: &mut CollisionDetector,
        bullet: &Bullet,
        hit: &Hit,
        effect: BulletEffect,
        out: &mut Vec<Event>,
    ) {
        let now = world.now();
        match effect {
            BulletEffect::Freeze { duration_ms } => {
                let Some(enemy) = live_enemy(world, hit.index) else {
                    return;
                };
                let until = now + Duration::from_millis(duration_ms);
                enemy.frozen_until = Some(enemy.frozen_until.map_or(until, |at| at.max(until)));
                let (position, size) = (enemy.position, enemy.size);
                let _ = world.add_effect(
                    EffectKind::Frost,
                    position,
                    size * 1.5,
                    EFFECT_LIFE,
                    FROST_COLOR,
                );
            }
            BulletEffect::Slow {
                factor,
                duration_ms,
            } => {
                if let Some(enemy) = live_enemy(world, hit.index) {
                    enemy.slow = Some(SlowStatus {
                        factor: factor.clamp(0.0, 1.0),
                        until: now + Duration::from_millis(duration_ms),
                    });
                }
            }
            BulletEffect::Burn {
                damage_per_second,
                duration_ms,
            } => mark_damage_over_time(
                world,
                hit.index,
                DotKind::Burn,
                damage_per_second,
                duration_ms,
            ),
            BulletEffect::Poison {
                damage_per_second,
                duration_ms,
            } => mark_damage_over_time(
                world,
                hit.index,
                DotKind::Poison,
                damage_per_second,
                duration_ms,
            ),
            BulletEffect::Chain {
                radius,
                max_jumps,
                falloff,
            } => {
                let spec = ChainSpec {
                    radius,
                    max_jumps,
                    falloff,
                };
                self.chain(world, detector, bullet.damage, hit, spec, out);
            }
            BulletEffect::Pierce { .. } => {}
        }
    }

    fn chain(
        &mut self,
        world: &mut World,
        detector: &mut CollisionDetector,
        damage: f32,
        hit: &Hit,
        spec: ChainSpec,
        out: &mut Vec<Event>,
    ) {
        let enemies = query::enemies(world);
        let Some(origin) = enemies.get(hit.index).map(|enemy| enemy.position) else {
            return;
        };
        detector.within_radius(origin, spec.radius, enemies, &mut self.nearby);
        self.nearby.retain(|&index| index != hit.index);
        // stable: equidistant enemies keep slice order
        self.nearby.sort_by(|&left, &right| {
            let left = enemies[left].position.distance_squared(origin);
            let right = enemies[right].position.distance_squared(origin);
            left.total_cmp(&right)
        });
        self.nearby.truncate(usize::from(spec.max_jumps));

        let mut damage = damage;
        let mut from = origin;
        for &index in &self.nearby {
            damage *= spec.falloff;
            let to = query::enemies(world)[index].position;
            let _ = world.damage_enemy(index, damage, out);
            let midpoint = Position::new((from.x + to.x) * 0.5, (from.y + to.y) * 0.5);
            let _ = world.add_effect(
                EffectKind::ChainArc,
                midpoint,
                from.distance(to) * 0.5,
                EFFECT_LIFE,
                ARC_COLOR,
            );
            from = to;
        }
    }

    fn splash(
        &mut self,
        world: &mut World,
        detector: &mut CollisionDetector,
        bullet: &Bullet,
        hit: &Hit,
        out: &mut Vec<Event>,
    ) {
        let centre = hit.contact.point;
        detector.within_radius(
            centre,
            bullet.splash_radius,
            query::enemies(world),
            &mut self.nearby,
        );
        let damage = bullet.damage * SPLASH_DAMAGE_RATIO;
        for &index in &self.nearby {
            if index != hit.index {
                let _ = world.damage_enemy(index, damage, out);
            }
        }
        let _ = world.add_effect(
            EffectKind::Explosion,
            centre,
            bullet.splash_radius,
            EFFECT_LIFE,
            EXPLOSION_COLOR,
        );
    }
}

fn live_enemy(world: &mut World, index: usize) -> Option<&mut Enemy> {
    world
        .enemies_mut()
        .get_mut(index)
        .filter(|enemy| enemy.is_alive())
}

/// Adds a burn or poison marker, replacing an existing marker of that kind.
fn mark_damage_over_time(
    world: &mut World,
    index: usize,
    kind: DotKind,
    damage_per_second: f32,
    duration_ms: u64,
) {
    let Some(enemy) = live_enemy(world, index) else {
        return;
    };
    enemy.damage_over_time.retain(|marker| marker.kind != kind);
    enemy.damage_over_time.push(DamageOverTime {
        kind,
        damage_per_second,
        remaining: Duration::from_millis(duration_ms),
    });
}
