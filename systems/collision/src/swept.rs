//! Continuous circle-versus-circle contact test.

use std::time::Duration;

use glam::Vec2;
use ring_defence_core::{Bullet, Position};

/// Moving circle swept across one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mover {
    /// Centre at the start of the tick.
    pub position: Position,
    /// Unit travel direction.
    pub direction: Vec2,
    /// Speed in units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
}

impl Mover {
    /// Describes a bullet as a swept circle.
    #[must_use]
    pub fn from_bullet(bullet: &Bullet) -> Self {
        Self {
            position: bullet.position,
            direction: bullet.direction,
            speed: bullet.speed,
            radius: bullet.size,
        }
    }

    /// Displacement covered during `dt`.
    #[must_use]
    pub fn displacement(&self, dt: Duration) -> Vec2 {
        self.direction * self.speed * dt.as_secs_f32()
    }
}

/// Stationary circle tested against a [`Mover`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    /// Centre.
    pub centre: Position,
    /// Radius.
    pub radius: f32,
}

/// Contact between a mover and a circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Point on the target surface facing the mover.
    pub point: Position,
    /// Fraction of the tick at which the circles first touch, in `[0, 1]`.
    pub time: f32,
    /// Overlap between the circles at the end of the tick, or at the start
    /// when they already overlapped.
    pub penetration_depth: f32,
}

/// Solves `|f + t·d| = r` for the earliest `t` in `[0, 1]`, where `f` is the
/// offset from the target centre to the mover and `d` the displacement.
#[must_use]
pub fn swept_circle(mover: &Mover, target: &Circle, dt: Duration) -> Option<Contact> {
    let centre = target.centre.to_vec2();
    let start = mover.position.to_vec2();
    let reach = mover.radius + target.radius;
    let offset = start - centre;

    let c = offset.length_squared() - reach * reach;
    if c <= 0.0 {
        return Some(Contact {
            point: surface_point(centre, start, target.radius),
            time: 0.0,
            penetration_depth: reach - offset.length(),
        });
    }

    let displacement = mover.displacement(dt);
    let a = displacement.length_squared();
    if a <= f32::EPSILON {
        return None;
    }

    let b = 2.0 * offset.dot(displacement);
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let time = (-b - discriminant.sqrt()) / (2.0 * a);
    if !(0.0..=1.0).contains(&time) {
        return None;
    }

    let touch = start + displacement * time;
    let end_gap = (start + displacement - centre).length();
    Some(Contact {
        point: surface_point(centre, touch, target.radius),
        time,
        penetration_depth: (reach - end_gap).max(0.0),
    })
}

fn surface_point(centre: Vec2, towards: Vec2, radius: f32) -> Position {
    let normal = (towards - centre).normalize_or_zero();
    Position::from_vec2(centre + normal * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mover(x: f32, y: f32, direction: Vec2, speed: f32) -> Mover {
        Mover {
            position: Position::new(x, y),
            direction,
            speed,
            radius: 2.0,
        }
    }

    fn circle(x: f32, y: f32, radius: f32) -> Circle {
        Circle {
            centre: Position::new(x, y),
            radius,
        }
    }

    #[test]
    fn fast_bullet_does_not_tunnel_through_enemy() {
        let contact = swept_circle(
            &mover(0.0, 0.0, Vec2::X, 1_000.0),
            &circle(50.0, 0.0, 10.0),
            Duration::from_millis(100),
        )
        .expect("swept test must detect the crossing");

        assert!((contact.time - 0.38).abs() < 1e-4, "time {}", contact.time);
        assert!((contact.point.x - 40.0).abs() < 1e-3);
        assert!(contact.point.y.abs() < 1e-3);
    }

    #[test]
    fn overlap_at_start_reports_time_zero() {
        let contact = swept_circle(
            &mover(45.0, 0.0, Vec2::X, 100.0),
            &circle(50.0, 0.0, 10.0),
            Duration::from_millis(16),
        )
        .expect("overlapping circles collide");

        assert_eq!(contact.time, 0.0);
        assert!((contact.penetration_depth - 7.0).abs() < 1e-4);
    }

    #[test]
    fn passing_wide_misses() {
        let contact = swept_circle(
            &mover(0.0, 100.0, Vec2::X, 1_000.0),
            &circle(50.0, 0.0, 10.0),
            Duration::from_millis(100),
        );
        assert!(contact.is_none());
    }

    #[test]
    fn contact_beyond_this_tick_is_deferred() {
        let contact = swept_circle(
            &mover(0.0, 0.0, Vec2::X, 100.0),
            &circle(50.0, 0.0, 10.0),
            Duration::from_millis(100),
        );
        assert!(contact.is_none());
    }

    #[test]
    fn moving_away_never_collides() {
        let contact = swept_circle(
            &mover(30.0, 0.0, -Vec2::X, 1_000.0),
            &circle(50.0, 0.0, 10.0),
            Duration::from_millis(100),
        );
        assert!(contact.is_none());
    }

    #[test]
    fn stationary_mover_outside_reach_misses() {
        let contact = swept_circle(
            &mover(0.0, 0.0, Vec2::ZERO, 0.0),
            &circle(50.0, 0.0, 10.0),
            Duration::from_millis(100),
        );
        assert!(contact.is_none());
    }
}
