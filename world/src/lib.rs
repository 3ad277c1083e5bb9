#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Ring Defence.
//!
//! The [`World`] owns every entity collection together with the bullet and
//! effect pools. Player intent enters through [`apply`]; systems mutate the
//! world through the narrow store surface on [`World`] (`damage_enemy`,
//! `damage_tower`, `remove_bullet`, `add_effect`, ...), which keeps kill
//! bookkeeping, gold payouts, and pool ownership in one place.

use std::{f32::consts::TAU, time::Duration};

use ring_defence_core::{
    BossKind, Bullet, BulletId, Color, Command, Effect, EffectId, EffectKind, Enemy, EnemyId,
    EnemyKind, Event, GoldSource, Health, Mine, MineId, Position, RejectReason, SimulationConfig,
    SlotIndex, TargetingStrategy, Tower, TowerClass, TowerId, TowerSlot, TowerType, UpgradeKind,
};
use ring_defence_system_pooling::{BulletPool, EffectPool};
use tracing::debug;

mod towers;

const DEATH_EFFECT_LIFE: Duration = Duration::from_millis(300);
const DESTROYED_EFFECT_LIFE: Duration = Duration::from_millis(500);
const DEATH_COLOR: Color = Color::from_rgb(0xff, 0x98, 0x00);
const DESTROYED_COLOR: Color = Color::from_rgb(0x79, 0x55, 0x48);

/// Outcome of a single [`World::damage_enemy`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyDamage {
    /// Damage soaked up by the enemy shield.
    pub absorbed: f32,
    /// Hit points removed from the enemy.
    pub dealt: f32,
    /// Set when this call killed the enemy.
    pub killed: bool,
}

/// Represents the authoritative Ring Defence simulation state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    now: Duration,
    tick_index: u64,
    enemies: Vec<Enemy>,
    slots: Vec<TowerSlot>,
    bullets: Vec<Bullet>,
    enemy_bullets: Vec<Bullet>,
    effects: Vec<Effect>,
    mines: Vec<Mine>,
    bullet_pool: BulletPool,
    effect_pool: EffectPool,
    gold: u32,
    base_integrity: u32,
    game_over: bool,
    next_enemy_id: u32,
    next_tower_id: u32,
    next_bullet_id: u32,
    next_effect_id: u32,
    next_mine_id: u32,
}

impl World {
    /// Creates a world laid out according to `config`.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        let mut bullet_pool = BulletPool::new();
        bullet_pool.prewarm(config.combat.pool_prewarm);
        let mut effect_pool = EffectPool::new();
        effect_pool.prewarm(config.combat.pool_prewarm);

        Self {
            slots: layout_slots(config),
            gold: config.economy.starting_gold,
            base_integrity: config.arena.base_integrity,
            config: config.clone(),
            now: Duration::ZERO,
            tick_index: 0,
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            effects: Vec::new(),
            mines: Vec::new(),
            bullet_pool,
            effect_pool,
            game_over: false,
            next_enemy_id: 0,
            next_tower_id: 0,
            next_bullet_id: 0,
            next_effect_id: 0,
            next_mine_id: 0,
        }
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Configuration the world was created with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Mutable access to the live enemies. The collection itself only changes
    /// through spawns, leaks, and [`World::reap_casualties`].
    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    /// Mutable access to the tower slots.
    pub fn slots_mut(&mut self) -> &mut [TowerSlot] {
        &mut self.slots
    }

    /// Applies damage to the enemy at `index`, letting its shield absorb first.
    ///
    /// Killing the enemy emits `EnemyKilled`, pays its bounty, and spawns a
    /// death effect. Dead or missing enemies take no damage.
    pub fn damage_enemy(&mut self, index: usize, amount: f32, out: &mut Vec<Event>) -> EnemyDamage {
        let Some(enemy) = self.enemies.get_mut(index) else {
            return EnemyDamage::default();
        };
        if !enemy.is_alive() || !(amount > 0.0) {
            return EnemyDamage::default();
        }

        let absorbed = amount.min(enemy.shield_strength.max(0.0));
        enemy.shield_strength -= absorbed;
        let change = enemy.health.apply(amount - absorbed);
        let report = EnemyDamage {
            absorbed,
            dealt: change.delta,
            killed: change.depleted,
        };
        if !change.depleted {
            return report;
        }

        let (id, kind, wave, gold, boss, position, size) = (
            enemy.id,
            enemy.kind,
            enemy.wave,
            enemy.gold_value,
            enemy.is_boss(),
            enemy.position,
            enemy.size,
        );
        debug!(enemy = id.get(), ?kind, wave, gold, "enemy killed");
        out.push(Event::EnemyKilled {
            enemy: id,
            kind,
            wave,
            gold,
            boss,
        });
        self.earn_gold(gold, GoldSource::Kill, out);
        let _ = self.add_effect(
            EffectKind::Death,
            position,
            size * 1.5,
            DEATH_EFFECT_LIFE,
            DEATH_COLOR,
        );
        report
    }

    /// Applies enemy fire to the tower in the slot at `index`.
    ///
    /// Damage is mitigated by the tower's effective armor as
    /// `amount × 100 / (100 + armor)`. A tower reduced to zero health is
    /// removed from its slot. Returns the hit points removed.
    pub fn damage_tower(&mut self, index: usize, amount: f32, out: &mut Vec<Event>) -> f32 {
        let Some(slot) = self.slots.get_mut(index) else {
            return 0.0;
        };
        let slot_index = slot.index;
        let Some(tower) = slot.tower.as_mut() else {
            return 0.0;
        };
        if !(amount > 0.0) {
            return 0.0;
        }

        let mitigated = amount * 100.0 / (100.0 + tower.effective_armor());
        let change = tower.health.apply(mitigated);
        out.push(Event::TowerDamaged {
            tower: tower.id,
            slot: slot_index,
            amount: change.delta,
        });

        if change.depleted {
            let tower_id = tower.id;
            let position = tower.position;
            let size = tower.size;
            slot.tower = None;
            debug!(tower = tower_id.get(), slot = slot_index.get(), "tower destroyed");
            out.push(Event::TowerDestroyed {
                tower: tower_id,
                slot: slot_index,
            });
            let _ = self.add_effect(
                EffectKind::Explosion,
                position,
                size * 2.0,
                DESTROYED_EFFECT_LIFE,
                DESTROYED_COLOR,
            );
        }
        change.delta
    }

    /// Moves a bullet out of the pool and assigns it a fresh identifier.
    pub fn acquire_bullet(&mut self) -> Bullet {
        let mut bullet = self.bullet_pool.acquire();
        bullet.id = BulletId::new(self.next_bullet_id);
        self.next_bullet_id = self.next_bullet_id.wrapping_add(1);
        bullet
    }

    /// Returns a bullet to the pool.
    pub fn remove_bullet(&mut self, bullet: Bullet) {
        self.bullet_pool.release(bullet);
    }

    /// Adds a tower bullet to the live list.
    pub fn push_bullet(&mut self, bullet: Bullet) {
        self.bullets.push(bullet);
    }

    /// Adds an enemy bullet to the live list.
    pub fn push_enemy_bullet(&mut self, bullet: Bullet) {
        self.enemy_bullets.push(bullet);
    }

    /// Moves every live tower bullet out for processing.
    pub fn take_bullets(&mut self) -> Vec<Bullet> {
        std::mem::take(&mut self.bullets)
    }

    /// Moves every live enemy bullet out for processing.
    pub fn take_enemy_bullets(&mut self) -> Vec<Bullet> {
        std::mem::take(&mut self.enemy_bullets)
    }

    /// Creates a transient visual effect.
    pub fn add_effect(
        &mut self,
        kind: EffectKind,
        position: Position,
        radius: f32,
        life: Duration,
        color: Color,
    ) -> EffectId {
        let mut effect = self.effect_pool.acquire();
        let id = EffectId::new(self.next_effect_id);
        self.next_effect_id = self.next_effect_id.wrapping_add(1);
        effect.id = id;
        effect.kind = kind;
        effect.position = position;
        effect.radius = radius;
        effect.life = life;
        effect.max_life = life;
        effect.color = color;
        self.effects.push(effect);
        id
    }

    /// Counts effect lifetimes down and returns expired effects to the pool.
    pub fn age_effects(&mut self, dt: Duration) {
        let mut index = 0;
        while index < self.effects.len() {
            let effect = &mut self.effects[index];
            effect.life = effect.life.saturating_sub(dt);
            if effect.life.is_zero() {
                let expired = self.effects.swap_remove(index);
                self.effect_pool.release(expired);
            } else {
                index += 1;
            }
        }
    }

    /// Removes the enemy at `index` after it reached the base.
    ///
    /// Base integrity drops by the enemy's leak damage; the first time it
    /// reaches zero the game ends with `BaseDestroyed`.
    pub fn leak_enemy(&mut self, index: usize, out: &mut Vec<Event>) {
        if index >= self.enemies.len() {
            return;
        }
        let enemy = self.enemies.remove(index);
        let damage = enemy.leak_damage;
        debug!(enemy = enemy.id.get(), wave = enemy.wave, damage, "enemy leaked");
        out.push(Event::EnemyLeaked {
            enemy: enemy.id,
            wave: enemy.wave,
            damage,
        });

        if self.game_over {
            return;
        }
        self.base_integrity = self.base_integrity.saturating_sub(damage);
        out.push(Event::BaseDamaged {
            amount: damage,
            remaining: self.base_integrity,
        });
        if self.base_integrity == 0 {
            self.game_over = true;
            out.push(Event::BaseDestroyed);
        }
    }

    /// Drops every enemy whose health reached zero.
    pub fn reap_casualties(&mut self) {
        self.enemies.retain(Enemy::is_alive);
    }

    /// Removes and returns the mine at `index`.
    pub fn remove_mine(&mut self, index: usize) -> Option<Mine> {
        (index < self.mines.len()).then(|| self.mines.remove(index))
    }

    /// Adds gold to the treasury and reports the payout.
    pub fn earn_gold(&mut self, amount: u32, source: GoldSource, out: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        self.gold = self.gold.saturating_add(amount);
        out.push(Event::GoldEarned { amount, source });
    }

    fn spend_gold(&mut self, amount: u32) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }

    fn slot_mut(&mut self, slot: SlotIndex) -> Option<&mut TowerSlot> {
        self.slots.get_mut(slot.get() as usize)
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn allocate_tower_id(&mut self) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.wrapping_add(1);
        id
    }

    fn allocate_mine_id(&mut self) -> MineId {
        let id = MineId::new(self.next_mine_id);
        self.next_mine_id = self.next_mine_id.wrapping_add(1);
        id
    }

    fn spawn_enemy(&mut self, spawn: EnemySpawn, out: &mut Vec<Event>) {
        let id = self.allocate_enemy_id();
        let mut enemy = match spawn.boss {
            Some(boss) => Enemy::new_boss(id, boss, spawn.kind, spawn.position),
            None => Enemy::new(id, spawn.kind, spawn.position),
        };
        enemy.wave = spawn.wave;

        let mut health_multiplier = spawn.health_multiplier.max(0.0);
        if spawn.special && spawn.boss.is_none() {
            let microbe = self.config.microbe;
            enemy.is_special = true;
            health_multiplier *= microbe.health_multiplier;
            enemy.gold_value = enemy.gold_value.saturating_mul(microbe.gold_multiplier);
            enemy.speed *= microbe.speed_multiplier;
        }
        enemy.health = Health::new(enemy.health.max() * health_multiplier);

        out.push(Event::EnemySpawned {
            enemy: id,
            kind: enemy.kind,
            boss: enemy.boss,
            special: enemy.is_special,
            wave: enemy.wave,
        });
        self.enemies.push(enemy);
    }

    fn build_tower(
        &mut self,
        slot: SlotIndex,
        tower_type: TowerType,
        class: Option<TowerClass>,
        bullet_type: usize,
        out: &mut Vec<Event>,
    ) -> Result<(), RejectReason> {
        let class = match tower_type {
            TowerType::Attack => class,
            TowerType::Economy => None,
        };
        let position = {
            let target = self.slot_mut(slot).ok_or(RejectReason::UnknownSlot)?;
            if !target.unlocked {
                return Err(RejectReason::SlotLocked);
            }
            if target.tower.is_some() {
                return Err(RejectReason::SlotOccupied);
            }
            target.position
        };

        let cost = towers::build_cost(&self.config.towers, tower_type, class);
        if !self.spend_gold(cost) {
            return Err(RejectReason::InsufficientGold);
        }

        let id = self.allocate_tower_id();
        let tower = Tower {
            tower_type,
            class,
            bullet_type,
            ..Tower::new(id, position, &self.config.towers)
        };
        if let Some(target) = self.slot_mut(slot) {
            target.tower = Some(tower);
        }
        out.push(Event::TowerBuilt {
            tower: id,
            slot,
            class,
            cost,
        });
        Ok(())
    }

    fn upgrade_tower(
        &mut self,
        slot: SlotIndex,
        upgrade: UpgradeKind,
        out: &mut Vec<Event>,
    ) -> Result<(), RejectReason> {
        let config = self.config.towers;
        let gold = self.gold;
        let target = self.slot_mut(slot).ok_or(RejectReason::UnknownSlot)?;
        let tower = target.tower.as_mut().ok_or(RejectReason::SlotEmpty)?;

        let (level, limit) = match upgrade {
            UpgradeKind::Tower => (tower.level, config.max_level),
            UpgradeKind::Bullet => {
                if !tower.is_attacker() {
                    return Err(RejectReason::NotAnAttacker);
                }
                (tower.bullet_level, config.max_bullet_level)
            }
        };
        if level >= limit {
            return Err(RejectReason::MaxLevel);
        }
        let cost = towers::upgrade_cost(&config, tower, upgrade);
        if gold < cost {
            return Err(RejectReason::InsufficientGold);
        }

        let level = match upgrade {
            UpgradeKind::Tower => {
                towers::raise_level(&config, tower);
                tower.level
            }
            UpgradeKind::Bullet => {
                tower.bullet_level += 1;
                tower.bullet_level
            }
        };
        let tower_id = tower.id;
        self.gold -= cost;
        out.push(Event::TowerUpgraded {
            tower: tower_id,
            slot,
            upgrade,
            level,
            cost,
        });
        Ok(())
    }

    fn dismantle_tower(&mut self, slot: SlotIndex, out: &mut Vec<Event>) -> Result<(), RejectReason> {
        let config = self.config.towers;
        let target = self.slot_mut(slot).ok_or(RejectReason::UnknownSlot)?;
        let tower = target.tower.take().ok_or(RejectReason::SlotEmpty)?;
        let refund = towers::refund(&config, &tower);
        out.push(Event::TowerDismantled {
            tower: tower.id,
            slot,
            refund,
        });
        self.earn_gold(refund, GoldSource::Refund, out);
        Ok(())
    }

    fn unlock_slot(&mut self, slot: SlotIndex, out: &mut Vec<Event>) -> Result<(), RejectReason> {
        let cost = self.config.towers.slot_unlock_cost;
        let gold = self.gold;
        let target = self.slot_mut(slot).ok_or(RejectReason::UnknownSlot)?;
        if target.unlocked {
            return Err(RejectReason::SlotAlreadyUnlocked);
        }
        if gold < cost {
            return Err(RejectReason::InsufficientGold);
        }
        target.unlocked = true;
        self.gold -= cost;
        out.push(Event::SlotUnlocked { slot, cost });
        Ok(())
    }

    fn place_mine(&mut self, position: Position, out: &mut Vec<Event>) -> Result<(), RejectReason> {
        let arena = &self.config.arena;
        let mines = self.config.mines;
        let distance = position.distance_from_origin();
        if !distance.is_finite() || distance > arena.radius || distance <= arena.goal_radius {
            return Err(RejectReason::MineOutOfBounds);
        }
        let spacing = mines.min_spacing * mines.min_spacing;
        if self
            .mines
            .iter()
            .any(|mine| mine.position.distance_squared(position) < spacing)
        {
            return Err(RejectReason::MineTooClose);
        }
        if !self.spend_gold(mines.cost) {
            return Err(RejectReason::InsufficientGold);
        }

        let id = self.allocate_mine_id();
        self.mines.push(Mine {
            id,
            position,
            radius: mines.radius,
            damage: mines.damage,
        });
        out.push(Event::MinePlaced { mine: id, position });
        Ok(())
    }

    fn set_targeting(
        &mut self,
        slot: SlotIndex,
        strategy: Option<TargetingStrategy>,
    ) -> Result<(), RejectReason> {
        let target = self.slot_mut(slot).ok_or(RejectReason::UnknownSlot)?;
        let tower = target.tower.as_mut().ok_or(RejectReason::SlotEmpty)?;
        if !tower.is_attacker() {
            return Err(RejectReason::NotAnAttacker);
        }
        tower.targeting = strategy;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct EnemySpawn {
    kind: EnemyKind,
    boss: Option<BossKind>,
    special: bool,
    position: Position,
    wave: u32,
    health_multiplier: f32,
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Player commands that cannot be honoured leave the world untouched and emit
/// `Event::CommandRejected`.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let slot = command_slot(&command);
    let result = match command {
        Command::Tick { dt } => {
            if !world.game_over {
                world.now = world.now.saturating_add(dt);
                world.tick_index = world.tick_index.saturating_add(1);
                out_events.push(Event::TimeAdvanced { dt });
            }
            Ok(())
        }
        Command::SpawnEnemy {
            kind,
            boss,
            special,
            position,
            wave,
            health_multiplier,
        } => {
            world.spawn_enemy(
                EnemySpawn {
                    kind,
                    boss,
                    special,
                    position,
                    wave,
                    health_multiplier,
                },
                out_events,
            );
            Ok(())
        }
        _ if world.game_over => Err(RejectReason::GameOver),
        Command::BuildTower {
            slot,
            tower_type,
            class,
            bullet_type,
        } => world.build_tower(slot, tower_type, class, bullet_type, out_events),
        Command::UpgradeTower { slot, upgrade } => world.upgrade_tower(slot, upgrade, out_events),
        Command::DismantleTower { slot } => world.dismantle_tower(slot, out_events),
        Command::UnlockSlot { slot } => world.unlock_slot(slot, out_events),
        Command::PlaceMine { position } => world.place_mine(position, out_events),
        Command::SetTargeting { slot, strategy } => world.set_targeting(slot, strategy),
    };

    if let Err(reason) = result {
        debug!(?reason, ?slot, "command rejected");
        out_events.push(Event::CommandRejected { slot, reason });
    }
}

fn command_slot(command: &Command) -> Option<SlotIndex> {
    match command {
        Command::BuildTower { slot, .. }
        | Command::UpgradeTower { slot, .. }
        | Command::DismantleTower { slot }
        | Command::UnlockSlot { slot }
        | Command::SetTargeting { slot, .. } => Some(*slot),
        Command::Tick { .. } | Command::SpawnEnemy { .. } | Command::PlaceMine { .. } => None,
    }
}

fn layout_slots(config: &SimulationConfig) -> Vec<TowerSlot> {
    let mut slots = Vec::new();
    for (ring_index, ring) in config.arena.slot_rings.iter().enumerate() {
        let stagger = if ring_index % 2 == 0 { 0.0 } else { 0.5 };
        for step in 0..ring.count {
            let angle = TAU * (step as f32 + stagger) / ring.count as f32;
            slots.push(TowerSlot {
                index: SlotIndex::new(slots.len() as u32),
                position: Position::new(angle.cos() * ring.radius, angle.sin() * ring.radius),
                unlocked: ring.unlocked,
                terrain: ring.terrain,
                tower: None,
            });
        }
    }
    slots
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use ring_defence_core::{
        Bullet, Effect, Enemy, Mine, SimulationConfig, SlotIndex, Tower, TowerSlot,
    };
    use ring_defence_system_pooling::PoolStats;

    use super::World;

    /// Current simulation time.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Every tower slot in index order.
    #[must_use]
    pub fn slots(world: &World) -> &[TowerSlot] {
        &world.slots
    }

    /// Slot with the provided index.
    #[must_use]
    pub fn slot(world: &World, index: SlotIndex) -> Option<&TowerSlot> {
        world.slots.get(index.get() as usize)
    }

    /// Built towers together with their slot index.
    pub fn towers(world: &World) -> impl Iterator<Item = (SlotIndex, &Tower)> {
        world
            .slots
            .iter()
            .filter_map(|slot| slot.tower.as_ref().map(|tower| (slot.index, tower)))
    }

    /// Live tower bullets.
    #[must_use]
    pub fn bullets(world: &World) -> &[Bullet] {
        &world.bullets
    }

    /// Live enemy bullets.
    #[must_use]
    pub fn enemy_bullets(world: &World) -> &[Bullet] {
        &world.enemy_bullets
    }

    /// Live visual effects.
    #[must_use]
    pub fn effects(world: &World) -> &[Effect] {
        &world.effects
    }

    /// Armed mines.
    #[must_use]
    pub fn mines(world: &World) -> &[Mine] {
        &world.mines
    }

    /// Gold currently available.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Remaining base integrity.
    #[must_use]
    pub fn base_integrity(world: &World) -> u32 {
        world.base_integrity
    }

    /// Reports whether the base has fallen.
    #[must_use]
    pub fn is_over(world: &World) -> bool {
        world.game_over
    }

    /// Bullet pool counters.
    #[must_use]
    pub fn bullet_pool_stats(world: &World) -> PoolStats {
        world.bullet_pool.stats()
    }

    /// Effect pool counters.
    #[must_use]
    pub fn effect_pool_stats(world: &World) -> PoolStats {
        world.effect_pool.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(&SimulationConfig::default())
    }

    fn spawn(world: &mut World, kind: EnemyKind, position: Position) -> usize {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                kind,
                boss: None,
                special: false,
                position,
                wave: 1,
                health_multiplier: 1.0,
            },
            &mut events,
        );
        query::enemies(world).len() - 1
    }

    fn build(world: &mut World, slot: u32, class: Option<TowerClass>) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::BuildTower {
                slot: SlotIndex::new(slot),
                tower_type: TowerType::Attack,
                class,
                bullet_type: 0,
            },
            &mut events,
        );
        events
    }

    fn rejection(events: &[Event]) -> Option<RejectReason> {
        events.iter().find_map(|event| match event {
            Event::CommandRejected { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    #[test]
    fn slots_follow_configured_rings() {
        let world = world();
        let slots = query::slots(&world);
        assert_eq!(slots.len(), 20);
        assert!((slots[0].position.distance_from_origin() - 140.0).abs() < 1e-3);
        assert!(slots[0].unlocked);
        assert!(!slots[19].unlocked);
        for (index, slot) in slots.iter().enumerate() {
            assert_eq!(slot.index.get() as usize, index);
        }
    }

    #[test]
    fn tick_advances_clock() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        assert_eq!(query::now(&world), Duration::from_millis(16));
        assert_eq!(query::tick_index(&world), 1);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
    }

    #[test]
    fn building_spends_gold_and_fills_slot() {
        let mut world = world();
        let events = build(&mut world, 0, None);

        assert!(matches!(events.as_slice(), [Event::TowerBuilt { cost: 50, .. }]));
        assert_eq!(query::gold(&world), 250);
        assert!(query::slot(&world, SlotIndex::new(0))
            .and_then(|slot| slot.tower.as_ref())
            .is_some());
    }

    #[test]
    fn building_into_occupied_or_locked_slot_is_rejected() {
        let mut world = world();
        let _ = build(&mut world, 0, None);

        assert_eq!(rejection(&build(&mut world, 0, None)), Some(RejectReason::SlotOccupied));
        assert_eq!(rejection(&build(&mut world, 19, None)), Some(RejectReason::SlotLocked));
        assert_eq!(rejection(&build(&mut world, 99, None)), Some(RejectReason::UnknownSlot));
    }

    #[test]
    fn unaffordable_tower_is_rejected_without_side_effects() {
        let mut world = World::new(&SimulationConfig {
            economy: ring_defence_core::EconomyConfig {
                starting_gold: 40,
                ..Default::default()
            },
            ..SimulationConfig::default()
        });

        let events = build(&mut world, 0, None);

        assert_eq!(rejection(&events), Some(RejectReason::InsufficientGold));
        assert_eq!(query::gold(&world), 40);
        assert_eq!(query::towers(&world).count(), 0);
    }

    #[test]
    fn killing_an_enemy_pays_bounty_once() {
        let mut world = world();
        let index = spawn(&mut world, EnemyKind::Basic, Position::new(200.0, 0.0));
        let gold_before = query::gold(&world);
        let mut events = Vec::new();

        let first = world.damage_enemy(index, 500.0, &mut events);
        let second = world.damage_enemy(index, 500.0, &mut events);

        assert!(first.killed);
        assert!(!second.killed);
        let kills = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert!(events.contains(&Event::GoldEarned {
            amount: 5,
            source: GoldSource::Kill
        }));
        assert_eq!(query::gold(&world), gold_before + 5);
    }

    #[test]
    fn shields_absorb_before_health() {
        let mut world = world();
        let index = spawn(&mut world, EnemyKind::Tank, Position::new(200.0, 0.0));
        let mut events = Vec::new();

        let report = world.damage_enemy(index, 50.0, &mut events);

        assert_eq!(report.absorbed, 40.0);
        assert_eq!(report.dealt, 10.0);
        assert_eq!(query::enemies(&world)[index].health.current(), 170.0);
    }

    #[test]
    fn tower_damage_is_mitigated_by_armor() {
        let mut world = world();
        let _ = build(&mut world, 0, None);
        let mut events = Vec::new();

        // wall strength 10: 110 × 100 / 110
        let dealt = world.damage_tower(0, 110.0, &mut events);

        assert!((dealt - 100.0).abs() < 1e-3);
        assert!(matches!(events.as_slice(), [Event::TowerDamaged { .. }]));
    }

    #[test]
    fn destroyed_tower_empties_its_slot() {
        let mut world = world();
        let _ = build(&mut world, 0, None);
        let mut events = Vec::new();

        let _ = world.damage_tower(0, 10_000.0, &mut events);

        assert!(events.iter().any(|event| matches!(event, Event::TowerDestroyed { .. })));
        assert_eq!(query::towers(&world).count(), 0);
    }

    #[test]
    fn leaks_end_the_game_when_integrity_runs_out() {
        let mut world = World::new(&SimulationConfig {
            arena: ring_defence_core::ArenaConfig {
                base_integrity: 2,
                ..Default::default()
            },
            ..SimulationConfig::default()
        });
        let mut events = Vec::new();
        for _ in 0..3 {
            let _ = spawn(&mut world, EnemyKind::Basic, Position::new(10.0, 0.0));
        }

        world.leak_enemy(0, &mut events);
        world.leak_enemy(0, &mut events);
        world.leak_enemy(0, &mut events);

        let destroyed = events
            .iter()
            .filter(|event| matches!(event, Event::BaseDestroyed))
            .count();
        assert_eq!(destroyed, 1);
        assert!(query::is_over(&world));
        assert_eq!(rejection(&build(&mut world, 0, None)), Some(RejectReason::GameOver));
    }

    #[test]
    fn upgrades_respect_max_level() {
        let mut world = World::new(&SimulationConfig {
            economy: ring_defence_core::EconomyConfig {
                starting_gold: 10_000,
                ..Default::default()
            },
            ..SimulationConfig::default()
        });
        let _ = build(&mut world, 0, None);
        let mut events = Vec::new();
        for _ in 0..5 {
            apply(
                &mut world,
                Command::UpgradeTower {
                    slot: SlotIndex::new(0),
                    upgrade: UpgradeKind::Tower,
                },
                &mut events,
            );
        }

        let upgrades = events
            .iter()
            .filter(|event| matches!(event, Event::TowerUpgraded { .. }))
            .count();
        assert_eq!(upgrades, 4);
        assert_eq!(rejection(&events), Some(RejectReason::MaxLevel));
    }

    #[test]
    fn dismantle_refunds_half_of_investment() {
        let mut world = world();
        let _ = build(&mut world, 0, None);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DismantleTower {
                slot: SlotIndex::new(0),
            },
            &mut events,
        );

        assert!(events.contains(&Event::GoldEarned {
            amount: 25,
            source: GoldSource::Refund
        }));
        assert_eq!(query::gold(&world), 275);
    }

    #[test]
    fn mine_placement_is_validated() {
        let mut world = world();
        let mut events = Vec::new();
        let place = |world: &mut World, x: f32, events: &mut Vec<Event>| {
            apply(
                world,
                Command::PlaceMine {
                    position: Position::new(x, 0.0),
                },
                events,
            );
        };

        place(&mut world, 200.0, &mut events);
        place(&mut world, 220.0, &mut events);
        place(&mut world, 10.0, &mut events);
        place(&mut world, 900.0, &mut events);

        assert_eq!(query::mines(&world).len(), 1);
        let reasons: Vec<RejectReason> = events
            .iter()
            .filter_map(|event| match event {
                Event::CommandRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::MineTooClose,
                RejectReason::MineOutOfBounds,
                RejectReason::MineOutOfBounds,
            ]
        );
    }

    #[test]
    fn support_towers_reject_targeting_overrides() {
        let mut world = world();
        let _ = build(&mut world, 0, Some(TowerClass::RepairStation));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetTargeting {
                slot: SlotIndex::new(0),
                strategy: Some(TargetingStrategy::Fastest),
            },
            &mut events,
        );

        assert_eq!(rejection(&events), Some(RejectReason::NotAnAttacker));
    }

    #[test]
    fn microbe_spawns_trade_health_for_gold() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Basic,
                boss: None,
                special: true,
                position: Position::new(500.0, 0.0),
                wave: 1,
                health_multiplier: 1.0,
            },
            &mut events,
        );

        let enemy = &query::enemies(&world)[0];
        assert!(enemy.is_special);
        assert_eq!(enemy.gold_value, 30);
        assert!((enemy.health.max() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn expired_effects_return_to_pool() {
        let mut world = world();
        let _ = world.add_effect(
            EffectKind::Hit,
            Position::ORIGIN,
            4.0,
            Duration::from_millis(100),
            Color::default(),
        );
        let available = query::effect_pool_stats(&world).available;

        world.age_effects(Duration::from_millis(60));
        assert_eq!(query::effects(&world).len(), 1);
        world.age_effects(Duration::from_millis(60));
        assert!(query::effects(&world).is_empty());
        assert_eq!(query::effect_pool_stats(&world).available, available + 1);
    }
}
