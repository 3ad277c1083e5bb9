use std::time::Duration;

use glam::Vec2;
use ring_defence_core::{
    Bullet, BulletEffect, Command, EffectKind, EnemyKind, Event, Health, Position,
    SimulationConfig, SlotIndex, TowerType,
};
use ring_defence_system_collision::CollisionDetector;
use ring_defence_system_projectiles::{BulletUpdate, EnemyFire, EnemyProjectiles};
use ring_defence_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(100);

fn spawn(world: &mut World, kind: EnemyKind, x: f32, y: f32) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            kind,
            boss: None,
            special: false,
            position: Position::new(x, y),
            wave: 1,
            health_multiplier: 1.0,
        },
        &mut events,
    );
}

fn fire(world: &mut World, from: Position, speed: f32, damage: f32, effect: Option<BulletEffect>) {
    let bullet = Bullet {
        position: from,
        direction: Vec2::X,
        speed,
        size: 4.0,
        damage,
        effect,
        pierce_remaining: match effect {
            Some(BulletEffect::Pierce { hits }) => hits,
            _ => 0,
        },
        life: Duration::from_secs(2),
        ..world.acquire_bullet()
    };
    world.push_bullet(bullet);
}

fn update(world: &mut World, dt: Duration) -> Vec<Event> {
    let mut detector = CollisionDetector::new(100.0);
    detector.rebuild(query::enemies(world));
    let mut events = Vec::new();
    BulletUpdate::new().handle(world, &mut detector, dt, &mut events);
    events
}

fn health(world: &World, index: usize) -> f32 {
    query::enemies(world)[index].health.current()
}

#[test]
fn fast_bullets_do_not_tunnel_through_enemies() {
    let mut world = World::new(&SimulationConfig::default());
    spawn(&mut world, EnemyKind::Basic, 250.0, 0.0);
    fire(&mut world, Position::ORIGIN, 5_000.0, 20.0, None);

    let _ = update(&mut world, TICK);

    assert!((health(&world, 0) - 30.0).abs() < 1e-4);
    assert!(query::bullets(&world).is_empty());
    assert!(query::effects(&world)
        .iter()
        .any(|effect| effect.kind == EffectKind::Hit));
}

#[test]
fn expired_bullets_return_to_the_pool() {
    let mut world = World::new(&SimulationConfig::default());
    let mut bullet = world.acquire_bullet();
    bullet.life = TICK;
    bullet.speed = 10.0;
    bullet.direction = Vec2::X;
    world.push_bullet(bullet);
    let available = query::bullet_pool_stats(&world).available;

    let _ = update(&mut world, TICK);

    assert!(query::bullets(&world).is_empty());
    assert_eq!(query::bullet_pool_stats(&world).available, available + 1);
}

#[test]
fn freeze_stops_the_struck_enemy() {
    let mut world = World::new(&SimulationConfig::default());
    spawn(&mut world, EnemyKind::Basic, 200.0, 0.0);
    fire(
        &mut world,
        Position::new(100.0, 0.0),
        1_000.0,
        1.0,
        Some(BulletEffect::Freeze { duration_ms: 1_500 }),
    );

    let _ = update(&mut world, TICK);

    let enemy = &query::enemies(&world)[0];
    assert_eq!(enemy.frozen_until, Some(Duration::from_millis(1_500)));
    assert!(query::effects(&world)
        .iter()
        .any(|effect| effect.kind == EffectKind::Frost));
}

#[test]
fn burn_markers_replace_each_other() {
    let mut world = World::new(&SimulationConfig::default());
    spawn(&mut world, EnemyKind::Tank, 200.0, 0.0);
    let burn = Some(BulletEffect::Burn {
        damage_per_second: 8.0,
        duration_ms: 3_000,
    });
    fire(&mut world, Position::new(100.0, 0.0), 1_000.0, 1.0, burn);
    let _ = update(&mut world, TICK);
    fire(&mut world, Position::new(100.0, 0.0), 1_000.0, 1.0, burn);
    let _ = update(&mut world, TICK);

    assert_eq!(query::enemies(&world)[0].damage_over_time.len(), 1);
}

#[test]
fn chain_jumps_to_the_nearest_neighbours_with_falloff() {
    let mut world = World::new(&SimulationConfig::default());
    spawn(&mut world, EnemyKind::Basic, 200.0, 0.0);
    spawn(&mut world, EnemyKind::Basic, 200.0, -80.0);
    spawn(&mut world, EnemyKind::Basic, 250.0, 0.0);
    spawn(&mut world, EnemyKind::Basic, 200.0, 60.0);
    fire(
        &mut world,
        Position::new(100.0, 0.0),
        1_000.0,
        10.0,
        Some(BulletEffect::Chain {
            radius: 90.0,
            max_jumps: 2,
            falloff: 0.5,
        }),
    );

    let _ = update(&mut world, TICK);

    assert!((health(&world, 0) - 40.0).abs() < 1e-4);
    assert!((health(&world, 2) - 45.0).abs() < 1e-4);
    assert!((health(&world, 3) - 47.5).abs() < 1e-4);
    assert!((health(&world, 1) - 50.0).abs() < 1e-4);
}

#[test]
fn pierce_passes_through_to_the_next_enemy_once() {
    let mut world = World::new(&SimulationConfig::default());
    spawn(&mut world, EnemyKind::Basic, 150.0, 0.0);
    spawn(&mut world, EnemyKind::Basic, 180.0, 0.0);
    fire(
        &mut world,
        Position::new(100.0, 0.0),
        1_000.0,
        10.0,
        Some(BulletEffect::Pierce { hits: 1 }),
    );

    let _ = update(&mut world, TICK);

    assert!((health(&world, 0) - 40.0).abs() < 1e-4);
    assert!((health(&world, 1) - 40.0).abs() < 1e-4);
    assert!(query::bullets(&world).is_empty());
}

#[test]
fn overlapping_enemies_are_each_pierced_once() {
    let mut world = World::new(&SimulationConfig::default());
    spawn(&mut world, EnemyKind::Basic, 150.0, 0.0);
    spawn(&mut world, EnemyKind::Basic, 160.0, 0.0);
    fire(
        &mut world,
        Position::new(100.0, 0.0),
        1_000.0,
        10.0,
        Some(BulletEffect::Pierce { hits: 2 }),
    );

    let _ = update(&mut world, TICK);
    let _ = update(&mut world, TICK);

    assert!((health(&world, 0) - 40.0).abs() < 1e-4);
    assert!((health(&world, 1) - 40.0).abs() < 1e-4);
    let bullet = &query::bullets(&world)[0];
    assert_eq!(bullet.pierce_remaining, 0);
    assert_eq!(bullet.struck.len(), 2);
}

#[test]
fn splash_damages_bystanders_at_reduced_strength() {
    let mut world = World::new(&SimulationConfig::default());
    spawn(&mut world, EnemyKind::Basic, 200.0, 0.0);
    spawn(&mut world, EnemyKind::Basic, 200.0, 40.0);
    spawn(&mut world, EnemyKind::Basic, 200.0, 150.0);
    let bullet = Bullet {
        position: Position::new(100.0, 0.0),
        direction: Vec2::X,
        speed: 1_000.0,
        size: 4.0,
        damage: 20.0,
        splash_radius: 60.0,
        life: Duration::from_secs(2),
        ..world.acquire_bullet()
    };
    world.push_bullet(bullet);

    let _ = update(&mut world, TICK);

    assert!((health(&world, 0) - 30.0).abs() < 1e-4);
    assert!((health(&world, 1) - 40.0).abs() < 1e-4);
    assert!((health(&world, 2) - 50.0).abs() < 1e-4);
}

#[test]
fn killing_blow_pays_the_bounty() {
    let mut world = World::new(&SimulationConfig::default());
    spawn(&mut world, EnemyKind::Swarm, 200.0, 0.0);
    let gold = query::gold(&world);
    fire(&mut world, Position::new(100.0, 0.0), 1_000.0, 100.0, None);

    let events = update(&mut world, TICK);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { gold: 2, .. })));
    assert_eq!(query::gold(&world), gold + 2);
}

fn world_with_tower() -> World {
    let mut world = World::new(&SimulationConfig::default());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::BuildTower {
            slot: SlotIndex::new(0),
            tower_type: TowerType::Attack,
            class: None,
            bullet_type: 0,
        },
        &mut events,
    );
    world
}

#[test]
fn tanks_shoot_towers_in_range() {
    let mut world = world_with_tower();
    let tower = query::slots(&world)[0].position;
    spawn(&mut world, EnemyKind::Tank, tower.x + 100.0, tower.y);
    let mut enemy_fire = EnemyFire::new();
    let mut projectiles = EnemyProjectiles::new();

    enemy_fire.handle(&mut world);
    assert_eq!(query::enemy_bullets(&world).len(), 1);
    enemy_fire.handle(&mut world);
    assert_eq!(query::enemy_bullets(&world).len(), 1, "cooldown not honoured");

    let mut events = Vec::new();
    projectiles.handle(&mut world, Duration::from_secs(1), &mut events);

    assert!(query::enemy_bullets(&world).is_empty());
    let damaged = events.iter().find_map(|event| match event {
        Event::TowerDamaged { amount, .. } => Some(*amount),
        _ => None,
    });
    // 8 mitigated by wall strength 10
    assert!(damaged.is_some_and(|amount| (amount - 800.0 / 110.0).abs() < 1e-3));
}

#[test]
fn scouts_carry_no_weapon() {
    let mut world = world_with_tower();
    let tower = query::slots(&world)[0].position;
    spawn(&mut world, EnemyKind::Scout, tower.x + 50.0, tower.y);

    EnemyFire::new().handle(&mut world);

    assert!(query::enemy_bullets(&world).is_empty());
}

#[test]
fn towers_at_zero_health_are_destroyed() {
    let mut world = world_with_tower();
    if let Some(tower) = world.slots_mut()[0].tower.as_mut() {
        tower.health = Health::new(5.0);
    }
    let tower = query::slots(&world)[0].position;
    let bullet = Bullet {
        position: Position::new(tower.x + 50.0, tower.y),
        direction: -Vec2::X,
        speed: 500.0,
        size: 5.0,
        damage: 8.0,
        life: Duration::from_secs(2),
        ..world.acquire_bullet()
    };
    world.push_enemy_bullet(bullet);
    let mut events = Vec::new();

    EnemyProjectiles::new().handle(&mut world, TICK, &mut events);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TowerDestroyed { .. })));
    assert!(query::slots(&world)[0].tower.is_none());
}
