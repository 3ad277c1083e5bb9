use std::time::Duration;

use glam::Vec2;
use ring_defence_core::{Bullet, Enemy, EnemyId, EnemyKind, Position};
use ring_defence_system_collision::{first_hit_linear, CollisionDetector};

fn enemy(id: u32, x: f32, y: f32) -> Enemy {
    Enemy {
        size: 10.0,
        ..Enemy::new(EnemyId::new(id), EnemyKind::Basic, Position::new(x, y))
    }
}

fn bullet(x: f32, y: f32, direction: Vec2, speed: f32) -> Bullet {
    Bullet {
        position: Position::new(x, y),
        direction,
        speed,
        size: 2.0,
        damage: 10.0,
        life: Duration::from_secs(2),
        ..Bullet::default()
    }
}

#[test]
fn detector_finds_enemy_crossed_mid_tick() {
    let enemies = vec![enemy(1, 50.0, 0.0)];
    let mut detector = CollisionDetector::new(100.0);
    detector.rebuild(&enemies);

    let hit = detector
        .first_hit(
            &bullet(0.0, 0.0, Vec2::X, 1_000.0),
            &enemies,
            Duration::from_millis(100),
            &[],
        )
        .expect("fast bullet hits the enemy");

    assert_eq!(hit.enemy, EnemyId::new(1));
    assert!((hit.contact.time - 0.38).abs() < 1e-4);
}

#[test]
fn earliest_contact_wins() {
    let enemies = vec![enemy(1, 90.0, 0.0), enemy(2, 40.0, 0.0), enemy(3, 70.0, 0.0)];
    let mut detector = CollisionDetector::new(100.0);
    detector.rebuild(&enemies);

    let hit = detector
        .first_hit(
            &bullet(0.0, 0.0, Vec2::X, 1_000.0),
            &enemies,
            Duration::from_millis(100),
            &[],
        )
        .expect("bullet hits one of the enemies");

    assert_eq!(hit.enemy, EnemyId::new(2));
    assert_eq!(hit.index, 1);
}

#[test]
fn excluded_and_dead_enemies_are_skipped() {
    let mut enemies = vec![enemy(1, 30.0, 0.0), enemy(2, 50.0, 0.0), enemy(3, 80.0, 0.0)];
    let _ = enemies[1].health.apply(1_000.0);
    let mut detector = CollisionDetector::new(100.0);
    detector.rebuild(&enemies);

    let hit = detector
        .first_hit(
            &bullet(0.0, 0.0, Vec2::X, 1_000.0),
            &enemies,
            Duration::from_millis(100),
            &[EnemyId::new(1)],
        )
        .expect("third enemy remains hittable");

    assert_eq!(hit.enemy, EnemyId::new(3));
}

#[test]
fn every_excluded_enemy_is_skipped() {
    let enemies = vec![enemy(1, 30.0, 0.0), enemy(2, 50.0, 0.0), enemy(3, 80.0, 0.0)];
    let mut detector = CollisionDetector::new(100.0);
    detector.rebuild(&enemies);

    let hit = detector
        .first_hit(
            &bullet(25.0, 0.0, Vec2::X, 1_000.0),
            &enemies,
            Duration::from_millis(100),
            &[EnemyId::new(1), EnemyId::new(2)],
        )
        .expect("third enemy remains hittable");

    assert_eq!(hit.enemy, EnemyId::new(3));
}

#[test]
fn accelerated_and_linear_variants_agree() {
    let enemies: Vec<Enemy> = (0..40)
        .map(|i| {
            let angle = i as f32 * 0.37;
            let distance = 30.0 + (i * 11 % 300) as f32;
            enemy(i, angle.cos() * distance, angle.sin() * distance)
        })
        .collect();
    let mut detector = CollisionDetector::new(100.0);
    detector.rebuild(&enemies);

    for step in 0..16 {
        let angle = step as f32 * std::f32::consts::TAU / 16.0;
        let shot = bullet(0.0, 0.0, Vec2::new(angle.cos(), angle.sin()), 900.0);
        let dt = Duration::from_millis(250);

        let fast = detector.first_hit(&shot, &enemies, dt, &[]);
        let slow = first_hit_linear(&shot, &enemies, dt, &[]);
        assert_eq!(fast.map(|hit| hit.enemy), slow.map(|hit| hit.enemy), "step {step}");
    }
}

#[test]
fn within_radius_filters_by_centre_distance() {
    let enemies = vec![enemy(1, 0.0, 0.0), enemy(2, 75.0, 0.0), enemy(3, 85.0, 0.0)];
    let mut detector = CollisionDetector::new(100.0);
    detector.rebuild(&enemies);

    let mut out = Vec::new();
    detector.within_radius(Position::ORIGIN, 80.0, &enemies, &mut out);

    assert_eq!(out, vec![0, 1]);
}
