#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision queries shared by bullets, mines, and area effects.
//!
//! [`SpatialIndex`] buckets the enemies of the current tick, [`swept_circle`]
//! performs the continuous test, and [`CollisionDetector`] combines both to
//! find the earliest enemy a bullet touches during a tick.

use std::time::Duration;

use ring_defence_core::{Bullet, Enemy, EnemyId, Position};

mod spatial;
mod swept;

pub use spatial::SpatialIndex;
pub use swept::{swept_circle, Circle, Contact, Mover};

/// Enemy struck by a bullet during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Index of the enemy in the slice the detector was rebuilt from.
    pub index: usize,
    /// Identifier of the struck enemy.
    pub enemy: EnemyId,
    /// Contact details.
    pub contact: Contact,
}

/// Spatially accelerated swept collision against the enemies of a tick.
#[derive(Clone, Debug)]
pub struct CollisionDetector {
    index: SpatialIndex,
    largest_radius: f32,
    candidates: Vec<usize>,
}

impl CollisionDetector {
    /// Creates a detector whose spatial index uses `cell_size` cells.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            index: SpatialIndex::new(cell_size),
            largest_radius: 0.0,
            candidates: Vec::new(),
        }
    }

    /// Indexes the live enemies of the current tick.
    pub fn rebuild(&mut self, enemies: &[Enemy]) {
        self.index.clear();
        self.largest_radius = 0.0;
        for (slot, enemy) in enemies.iter().enumerate() {
            if !enemy.is_alive() {
                continue;
            }
            self.index.insert(slot, enemy.position);
            self.largest_radius = self.largest_radius.max(enemy.size);
        }
    }

    /// Spatial index consulted by the detector.
    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Finds the earliest live enemy the bullet touches during `dt`.
    ///
    /// Enemies listed in `exclude` are never reported. Ties keep the enemy
    /// that appears first in the slice.
    pub fn first_hit(
        &mut self,
        bullet: &Bullet,
        enemies: &[Enemy],
        dt: Duration,
        exclude: &[EnemyId],
    ) -> Option<Hit> {
        let mover = Mover::from_bullet(bullet);
        let displacement = mover.displacement(dt);
        let midpoint = bullet.position.offset(displacement * 0.5);
        let reach = displacement.length() * 0.5 + mover.radius + self.largest_radius;

        self.index.query_radius(midpoint, reach, &mut self.candidates);
        earliest_contact(
            &mover,
            self.candidates.iter().copied(),
            enemies,
            dt,
            exclude,
        )
    }

    /// Writes the indices of live enemies whose centre lies within `radius` of
    /// `centre`, in slice order.
    pub fn within_radius(
        &mut self,
        centre: Position,
        radius: f32,
        enemies: &[Enemy],
        out: &mut Vec<usize>,
    ) {
        self.index.query_radius(centre, radius, &mut self.candidates);
        out.clear();
        let limit = radius * radius;
        out.extend(self.candidates.iter().copied().filter(|&slot| {
            enemies.get(slot).is_some_and(|enemy| {
                enemy.is_alive() && enemy.position.distance_squared(centre) <= limit
            })
        }));
    }
}

/// Unaccelerated variant of [`CollisionDetector::first_hit`] that tests every
/// enemy in the slice.
#[must_use]
pub fn first_hit_linear(
    bullet: &Bullet,
    enemies: &[Enemy],
    dt: Duration,
    exclude: &[EnemyId],
) -> Option<Hit> {
    earliest_contact(
        &Mover::from_bullet(bullet),
        0..enemies.len(),
        enemies,
        dt,
        exclude,
    )
}

fn earliest_contact<I>(
    mover: &Mover,
    candidates: I,
    enemies: &[Enemy],
    dt: Duration,
    exclude: &[EnemyId],
) -> Option<Hit>
where
    I: IntoIterator<Item = usize>,
{
    let mut best: Option<Hit> = None;
    for slot in candidates {
        let Some(enemy) = enemies.get(slot) else {
            continue;
        };
        if !enemy.is_alive() || exclude.contains(&enemy.id) {
            continue;
        }
        let target = Circle {
            centre: enemy.position,
            radius: enemy.size,
        };
        let Some(contact) = swept_circle(mover, &target, dt) else {
            continue;
        };
        if best.map_or(true, |current| contact.time < current.contact.time) {
            best = Some(Hit {
                index: slot,
                enemy: enemy.id,
                contact,
            });
        }
    }
    best
}
