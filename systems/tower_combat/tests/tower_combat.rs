use std::time::Duration;

use ring_defence_core::{
    Command, EffectKind, EnemyKind, Event, Position, SimulationConfig, SlotIndex, TowerClass,
    TowerConfig, TowerType,
};
use ring_defence_system_tower_combat::TowerFiring;
use ring_defence_world::{self as world, query, World};

fn world_with_fire_rate(fire_rate_ms: u64) -> World {
    World::new(&SimulationConfig {
        towers: TowerConfig {
            fire_rate_ms,
            ..TowerConfig::default()
        },
        ..SimulationConfig::default()
    })
}

fn build(world: &mut World, slot: u32, tower_type: TowerType, class: Option<TowerClass>) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::BuildTower {
            slot: SlotIndex::new(slot),
            tower_type,
            class,
            bullet_type: 0,
        },
        &mut events,
    );
    assert!(
        events
            .iter()
            .any(|event| matches!(event, Event::TowerBuilt { .. })),
        "build failed: {events:?}"
    );
}

fn spawn_at(world: &mut World, position: Position) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            kind: EnemyKind::Tank,
            boss: None,
            special: false,
            position,
            wave: 1,
            health_multiplier: 1.0,
        },
        &mut events,
    );
}

fn advance(world: &mut World, firing: &mut TowerFiring, dt_ms: u64) -> usize {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(dt_ms),
        },
        &mut events,
    );
    firing.handle(world, &mut events);
    events
        .iter()
        .filter(|event| matches!(event, Event::TowerFired { .. }))
        .count()
}

#[test]
fn fire_rate_gates_consecutive_shots() {
    let mut world = world_with_fire_rate(500);
    build(&mut world, 0, TowerType::Attack, None);
    let tower = query::slots(&world)[0].position;
    spawn_at(&mut world, tower.offset(glam::Vec2::new(60.0, 0.0)));
    let mut firing = TowerFiring::new();

    assert_eq!(advance(&mut world, &mut firing, 0), 1);
    assert_eq!(advance(&mut world, &mut firing, 100), 0);
    assert_eq!(advance(&mut world, &mut firing, 399), 0);
    assert_eq!(advance(&mut world, &mut firing, 1), 1);
    assert_eq!(query::bullets(&world).len(), 2);
}

#[test]
fn towers_without_targets_stay_ready() {
    let mut world = world_with_fire_rate(500);
    build(&mut world, 0, TowerType::Attack, None);
    let mut firing = TowerFiring::new();

    assert_eq!(advance(&mut world, &mut firing, 1_000), 0);
    assert!(query::slots(&world)[0]
        .tower
        .as_ref()
        .is_some_and(|tower| tower.last_fired.is_none()));

    let tower = query::slots(&world)[0].position;
    spawn_at(&mut world, tower.offset(glam::Vec2::new(0.0, 40.0)));
    assert_eq!(advance(&mut world, &mut firing, 16), 1);
}

#[test]
fn economy_and_support_towers_never_fire() {
    let mut world = world_with_fire_rate(100);
    build(&mut world, 0, TowerType::Economy, None);
    build(&mut world, 1, TowerType::Attack, Some(TowerClass::ShieldGenerator));
    for slot in 0..2 {
        let tower = query::slots(&world)[slot].position;
        spawn_at(&mut world, tower.offset(glam::Vec2::new(10.0, 0.0)));
    }
    let mut firing = TowerFiring::new();

    assert_eq!(advance(&mut world, &mut firing, 0), 0);
    assert!(query::bullets(&world).is_empty());
}

#[test]
fn gatling_fires_two_bullets_with_muzzle_flashes() {
    let mut world = world_with_fire_rate(500);
    build(&mut world, 0, TowerType::Attack, Some(TowerClass::Gatling));
    let tower = query::slots(&world)[0].position;
    spawn_at(&mut world, tower.offset(glam::Vec2::new(30.0, 0.0)));
    spawn_at(&mut world, tower.offset(glam::Vec2::new(-30.0, 0.0)));
    let mut firing = TowerFiring::new();

    assert_eq!(advance(&mut world, &mut firing, 0), 2);
    let flashes = query::effects(&world)
        .iter()
        .filter(|effect| effect.kind == EffectKind::MuzzleFlash)
        .count();
    assert_eq!(flashes, 2);
    assert!(query::bullets(&world)
        .iter()
        .all(|bullet| bullet.source.is_some() && (bullet.direction.length() - 1.0).abs() < 1e-5));
}

#[test]
fn nearby_complementary_classes_gain_synergy() {
    let mut world = World::new(&SimulationConfig::default());
    // slots 0 and 1 on the inner ring are 140 apart, inside the synergy radius
    build(&mut world, 0, TowerType::Attack, Some(TowerClass::Sniper));
    build(&mut world, 1, TowerType::Attack, Some(TowerClass::Laser));
    let mut firing = TowerFiring::new();

    let _ = advance(&mut world, &mut firing, 0);

    for slot in 0..2 {
        let synergy = query::slots(&world)[slot]
            .tower
            .as_ref()
            .map(|tower| tower.synergy)
            .unwrap_or_default();
        assert!((synergy.range - 0.10).abs() < 1e-6, "slot {slot}");
    }
}
