#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Passive support auras: shield generators and repair stations.
//!
//! Shield bonuses are recomputed from scratch every tick. A generator
//! regenerates its own pool and projects `bonus × pool / capacity` extra wall
//! strength onto every tower in range; overlapping generators do not stack,
//! the strongest projection wins. Repair stations pulse on a fixed interval
//! and heal every other damaged tower within their radius.

use std::time::Duration;

use ring_defence_core::{Color, EffectKind, Event, Position, SupportRole};
use ring_defence_world::World;
use tracing::debug;

const SHIELD_COLOR: Color = Color::from_rgb(0x4f, 0xc3, 0xf7);
const REPAIR_COLOR: Color = Color::from_rgb(0x66, 0xbb, 0x6a);
const AURA_LIFE: Duration = Duration::from_millis(400);

#[derive(Clone, Copy, Debug)]
struct Aura {
    position: Position,
    radius: f32,
    bonus: f32,
}

#[derive(Clone, Copy, Debug)]
struct Pulse {
    slot: usize,
    position: Position,
    radius: f32,
    rate: f32,
}

/// Shield and repair support system.
#[derive(Debug, Default)]
pub struct DefenseSupport {
    auras: Vec<Aura>,
    pulses: Vec<Pulse>,
    charged: Vec<(Position, f32)>,
    healed: Vec<(Position, f32)>,
}

impl DefenseSupport {
    /// Creates a new support system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerates shields, projects their bonus, and runs due repair pulses.
    pub fn handle(&mut self, world: &mut World, dt: Duration, out: &mut Vec<Event>) {
        self.charge_shields(world, dt);
        self.project_shields(world);
        self.collect_pulses(world, dt);
        self.apply_pulses(world, out);

        for &(position, radius) in &self.charged {
            let _ = world.add_effect(
                EffectKind::ShieldAura,
                position,
                radius,
                AURA_LIFE,
                SHIELD_COLOR,
            );
        }
    }

    fn charge_shields(&mut self, world: &mut World, dt: Duration) {
        self.auras.clear();
        self.charged.clear();
        for slot in world.slots_mut() {
            let Some(tower) = slot.tower.as_mut() else {
                continue;
            };
            tower.shield_bonus = 0.0;
            let Some(SupportRole::Shield {
                capacity,
                regen_per_second,
                bonus,
                radius,
            }) = tower.class.and_then(|class| class.descriptor().support)
            else {
                continue;
            };
            if capacity <= 0.0 {
                continue;
            }

            let before = tower.shield_pool;
            tower.shield_pool = (before + regen_per_second * dt.as_secs_f32()).min(capacity);
            if before < capacity && tower.shield_pool >= capacity {
                self.charged.push((tower.position, radius));
            }
            self.auras.push(Aura {
                position: tower.position,
                radius,
                bonus: bonus * tower.shield_pool / capacity,
            });
        }
    }

    fn project_shields(&self, world: &mut World) {
        if self.auras.is_empty() {
            return;
        }
        for slot in world.slots_mut() {
            let Some(tower) = slot.tower.as_mut() else {
                continue;
            };
            let strongest = self
                .auras
                .iter()
                .filter(|aura| aura.position.distance(tower.position) <= aura.radius)
                .map(|aura| aura.bonus)
                .fold(0.0_f32, f32::max);
            tower.shield_bonus = strongest;
        }
    }

    fn collect_pulses(&mut self, world: &mut World, dt: Duration) {
        self.pulses.clear();
        for (index, slot) in world.slots_mut().iter_mut().enumerate() {
            let Some(tower) = slot.tower.as_mut() else {
                continue;
            };
            let Some(SupportRole::Repair {
                rate,
                interval_ms,
                radius,
            }) = tower.class.and_then(|class| class.descriptor().support)
            else {
                continue;
            };
            let interval = Duration::from_millis(interval_ms);
            if interval.is_zero() {
                continue;
            }

            tower.repair_timer = tower.repair_timer.saturating_add(dt);
            if tower.repair_timer < interval {
                continue;
            }
            tower.repair_timer -= interval;
            self.pulses.push(Pulse {
                slot: index,
                position: tower.position,
                radius,
                rate,
            });
        }
    }

    fn apply_pulses(&mut self, world: &mut World, out: &mut Vec<Event>) {
        for pulse in &self.pulses {
            self.healed.clear();
            for (index, slot) in world.slots_mut().iter_mut().enumerate() {
                if index == pulse.slot {
                    continue;
                }
                let Some(tower) = slot.tower.as_mut() else {
                    continue;
                };
                if !tower.health.is_damaged()
                    || tower.position.distance(pulse.position) > pulse.radius
                {
                    continue;
                }
                let change = tower.health.apply(-pulse.rate);
                let amount = -change.delta;
                if amount <= 0.0 {
                    continue;
                }
                debug!(tower = tower.id.get(), amount, "tower repaired");
                out.push(Event::TowerRepaired {
                    tower: tower.id,
                    slot: slot.index,
                    amount,
                });
                self.healed.push((tower.position, tower.size));
            }
            for &(position, size) in &self.healed {
                let _ = world.add_effect(
                    EffectKind::Repair,
                    position,
                    size * 1.5,
                    AURA_LIFE,
                    REPAIR_COLOR,
                );
            }
        }
    }
}
