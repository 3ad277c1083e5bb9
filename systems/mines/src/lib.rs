#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! One-shot proximity mines.
//!
//! A mine detonates on the first tick at least one live enemy centre lies
//! inside its radius. Every enemy in range takes the mine's damage and the
//! mine is consumed. The explosion is drawn as three layered effects.
//! A configured `edge_damage_ratio` below one tapers the damage linearly
//! toward the rim.

use std::time::Duration;

use ring_defence_core::{Color, EffectKind, Event, Mine};
use ring_defence_system_collision::CollisionDetector;
use ring_defence_world::{query, World};
use tracing::debug;

/// Layer of the explosion drawn when a mine goes off.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Layer {
    kind: EffectKind,
    radius_scale: f32,
    life: Duration,
    color: Color,
}

const EXPLOSION_LAYERS: [Layer; 3] = [
    Layer {
        kind: EffectKind::MineCore,
        radius_scale: 0.35,
        life: Duration::from_millis(150),
        color: Color::from_rgb(0xff, 0xf5, 0x9d),
    },
    Layer {
        kind: EffectKind::MineBlast,
        radius_scale: 1.0,
        life: Duration::from_millis(400),
        color: Color::from_rgb(0xff, 0x6f, 0x00),
    },
    Layer {
        kind: EffectKind::MineSmoke,
        radius_scale: 1.3,
        life: Duration::from_millis(1_200),
        color: Color::from_rgb(0x61, 0x61, 0x61),
    },
];

/// Damage dealt at `distance` from the centre of a mine.
///
/// Falls off linearly from `mine.damage` at the centre to
/// `mine.damage × edge_ratio` at the rim.
#[must_use]
pub fn falloff_damage(mine: &Mine, distance: f32, edge_ratio: f32) -> f32 {
    if mine.radius <= 0.0 {
        return mine.damage;
    }
    let edge_ratio = edge_ratio.clamp(0.0, 1.0);
    let reach = (distance / mine.radius).clamp(0.0, 1.0);
    mine.damage * (1.0 - (1.0 - edge_ratio) * reach)
}

/// Mine trigger system.
#[derive(Debug, Default)]
pub struct MineField {
    nearby: Vec<usize>,
    detonated: Vec<usize>,
}

impl MineField {
    /// Creates a new mine system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detonates every mine with a live enemy inside its radius.
    ///
    /// `detector` must have been rebuilt from the enemies of this tick.
    pub fn handle(
        &mut self,
        world: &mut World,
        detector: &mut CollisionDetector,
        out: &mut Vec<Event>,
    ) {
        let edge_ratio = query::config(world).mines.edge_damage_ratio;
        self.detonated.clear();

        for index in 0..query::mines(world).len() {
            let mine = query::mines(world)[index];
            detector.within_radius(
                mine.position,
                mine.radius,
                query::enemies(world),
                &mut self.nearby,
            );
            if self.nearby.is_empty() {
                continue;
            }

            for &enemy in &self.nearby {
                let distance = query::enemies(world)[enemy].position.distance(mine.position);
                let damage = falloff_damage(&mine, distance, edge_ratio);
                let _ = world.damage_enemy(enemy, damage, out);
            }
            for layer in EXPLOSION_LAYERS {
                let _ = world.add_effect(
                    layer.kind,
                    mine.position,
                    mine.radius * layer.radius_scale,
                    layer.life,
                    layer.color,
                );
            }

            let hits = self.nearby.len() as u32;
            debug!(mine = mine.id.get(), hits, "mine detonated");
            out.push(Event::MineDetonated { mine: mine.id, hits });
            self.detonated.push(index);
        }

        for &index in self.detonated.iter().rev() {
            let _ = world.remove_mine(index);
        }
    }
}
