#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy status and movement system.
//!
//! Each tick ticks burn and poison markers, promotes bosses through their
//! phases, walks every mobile enemy straight toward the map centre, and
//! reports enemies that reach the base as leaks.

use std::time::Duration;

use glam::Vec2;
use ring_defence_core::{
    tables::{boss_phase_for, boss_phase_speed_multiplier},
    Enemy, Event, Position,
};
use ring_defence_world::World;
use tracing::debug;

/// Moves enemies toward the base and resolves their timed status effects.
#[derive(Debug, Default)]
pub struct Movement {
    dot_damage: Vec<(usize, f32)>,
    leaked: Vec<usize>,
}

impl Movement {
    /// Creates a new movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every live enemy by `dt`.
    pub fn handle(&mut self, world: &mut World, dt: Duration, out: &mut Vec<Event>) {
        if dt.is_zero() {
            return;
        }

        self.dot_damage.clear();
        for (index, enemy) in world.enemies_mut().iter_mut().enumerate() {
            if !enemy.is_alive() {
                continue;
            }
            let damage = tick_damage_over_time(enemy, dt);
            if damage > 0.0 {
                self.dot_damage.push((index, damage));
            }
        }
        for &(index, damage) in &self.dot_damage {
            let _ = world.damage_enemy(index, damage, out);
        }

        let now = world.now();
        let goal_radius = world.config().arena.goal_radius;
        self.leaked.clear();
        for (index, enemy) in world.enemies_mut().iter_mut().enumerate() {
            if !enemy.is_alive() {
                continue;
            }
            advance_boss_phase(enemy, out);
            expire_statuses(enemy, now);
            if enemy.is_frozen(now) {
                continue;
            }
            if step_toward_goal(enemy, dt, goal_radius) {
                self.leaked.push(index);
            }
        }

        for &index in self.leaked.iter().rev() {
            world.leak_enemy(index, out);
        }
    }
}

/// Applies burn and poison for `dt` and drops expired markers. Returns the
/// total damage owed by the enemy.
fn tick_damage_over_time(enemy: &mut Enemy, dt: Duration) -> f32 {
    let mut total = 0.0;
    for marker in &mut enemy.damage_over_time {
        let active = dt.min(marker.remaining);
        total += marker.damage_per_second * active.as_secs_f32();
        marker.remaining = marker.remaining.saturating_sub(dt);
    }
    enemy
        .damage_over_time
        .retain(|marker| !marker.remaining.is_zero());
    total
}

fn advance_boss_phase(enemy: &mut Enemy, out: &mut Vec<Event>) {
    let Some(boss) = enemy.boss else {
        return;
    };
    let phase = boss_phase_for(enemy.health.fraction());
    if phase <= enemy.boss_phase {
        return;
    }
    enemy.boss_phase = phase;
    debug!(enemy = enemy.id.get(), ?boss, phase, "boss phase changed");
    out.push(Event::BossPhaseChanged {
        enemy: enemy.id,
        boss,
        phase,
    });
}

fn expire_statuses(enemy: &mut Enemy, now: Duration) {
    if enemy.frozen_until.is_some_and(|until| now >= until) {
        enemy.frozen_until = None;
    }
    if enemy.slow.is_some_and(|slow| now >= slow.until) {
        enemy.slow = None;
    }
}

/// Current movement speed including slows and boss phase bonuses.
#[must_use]
pub fn effective_speed(enemy: &Enemy) -> f32 {
    let slow = enemy.slow.map_or(1.0, |slow| slow.factor.clamp(0.0, 1.0));
    let phase = if enemy.is_boss() {
        boss_phase_speed_multiplier(enemy.boss_phase)
    } else {
        1.0
    };
    enemy.speed * slow * phase
}

/// Moves the enemy toward the centre. Returns `true` when it reached the goal.
fn step_toward_goal(enemy: &mut Enemy, dt: Duration, goal_radius: f32) -> bool {
    let position = enemy.position.to_vec2();
    let distance = position.length();
    let step = effective_speed(enemy) * dt.as_secs_f32();

    if distance - step <= goal_radius {
        enemy.position = Position::from_vec2(position.normalize_or_zero() * goal_radius);
        return true;
    }

    let heading: Vec2 = -position / distance;
    enemy.position = enemy.position.offset(heading * step);
    false
}
