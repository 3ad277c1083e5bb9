#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ring Defence combat simulation.
//!
//! This crate defines the plain data that every system operates on together
//! with the message surface that connects them. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and every mutation committed during a tick is
//! broadcast as an [`Event`] for listeners (reward trackers, renderers) to
//! consume. Entities are plain structs without behaviour attached; systems are
//! free-standing and receive the simulation state explicitly each tick.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod tables;

pub use config::{
    ArenaConfig, CombatConfig, ConfigError, EconomyConfig, LoopConfig, MicrobeConfig,
    MineConfig, SimulationConfig, SlotRingConfig, SpatialConfig, SpawningConfig, TowerConfig,
    WaveCompositionTable, WaveDefinition,
};
pub use tables::{
    BossKind, BossProfile, BulletEffect, BulletTypeSpec, BulletTypeTable, EnemyKind,
    EnemyProfile, EnemyWeapon, SupportRole, TowerClass, TowerClassDescriptor, WaveEntry,
    NEUTRAL_BULLET_TYPE,
};

/// Plain 2D coordinate measured in world units. The map centre is the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// Centre of the circular map, where enemies are headed.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Creates a new position from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        self.to_vec2().distance(other.to_vec2())
    }

    /// Squared Euclidean distance between two positions.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> f32 {
        self.to_vec2().distance_squared(other.to_vec2())
    }

    /// Distance from the map centre.
    #[must_use]
    pub fn distance_from_origin(self) -> f32 {
        self.to_vec2().length()
    }

    /// Returns the position displaced by the provided vector.
    #[must_use]
    pub fn offset(self, delta: Vec2) -> Self {
        Self::from_vec2(self.to_vec2() + delta)
    }

    /// Converts the position into a `glam` vector for arithmetic.
    #[must_use]
    pub const fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Creates a position from a `glam` vector.
    #[must_use]
    pub const fn from_vec2(value: Vec2) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Vec2> for Position {
    fn from(value: Vec2) -> Self {
        Self::from_vec2(value)
    }
}

impl From<Position> for Vec2 {
    fn from(value: Position) -> Self {
        value.to_vec2()
    }
}

/// Unique identifier assigned to an enemy.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a live bullet. Values may be reused once a bullet is pooled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the bullet identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a transient visual effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u32);

impl EffectId {
    /// Creates a new effect identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the effect identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a placed mine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MineId(u32);

impl MineId {
    /// Creates a new mine identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the mine identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a fixed tower slot on the map.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SlotIndex(u32);

impl SlotIndex {
    /// Creates a new slot index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric slot index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visual tint handed to the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Hit points clamped to `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates a full health pool with the provided maximum.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        Self { current: max, max }
    }

    /// Current hit points.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Remaining health as a fraction of the maximum.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    /// Reports whether the pool has been emptied.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Reports whether the pool is below its maximum.
    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.current < self.max
    }

    /// Applies a signed amount: positive values damage, negative values heal.
    ///
    /// The result is clamped to `[0, max]`. A depleted pool ignores further
    /// damage, so `depleted` is reported exactly once per pool.
    pub fn apply(&mut self, amount: f32) -> HealthChange {
        if !amount.is_finite() || amount == 0.0 {
            return HealthChange::default();
        }

        if amount > 0.0 && self.is_depleted() {
            return HealthChange::default();
        }

        let before = self.current;
        self.current = (self.current - amount).clamp(0.0, self.max);
        HealthChange {
            delta: before - self.current,
            depleted: before > 0.0 && self.current <= 0.0,
        }
    }

    /// Raises the maximum by `factor`, preserving the current fraction.
    pub fn scale_max(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fraction = self.fraction();
        self.max *= factor;
        self.current = (self.max * fraction).clamp(0.0, self.max);
    }
}

/// Outcome of a [`Health::apply`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HealthChange {
    /// Hit points actually removed (negative when healed).
    pub delta: f32,
    /// Set when this call crossed the pool from positive to zero.
    pub depleted: bool,
}

/// Named strategies a tower uses to choose among enemies in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingStrategy {
    /// Closest enemy to the tower.
    Nearest,
    /// Farthest enemy still in range.
    Furthest,
    /// Enemy with the most remaining health.
    HighestHp,
    /// Enemy with the least remaining health.
    LowestHp,
    /// Enemy with the highest movement speed.
    Fastest,
    /// Enemy worth the most gold.
    HighestValue,
    /// Enemy with the highest composite threat score.
    ThreatAssessment,
    /// Enemy closest to the map centre.
    ClosestToExit,
}

/// Behavioural category of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerType {
    /// Tower that fires bullets at enemies.
    Attack,
    /// Tower that generates gold and never fires.
    Economy,
}

/// Terrain bonus attached to a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotTerrain {
    /// No positional bonus.
    #[default]
    Open,
    /// Narrow approach that increases damage.
    Chokepoint,
    /// Elevated ground that increases range.
    HighGround,
}

/// Damage-over-time categories applied by bullet effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DotKind {
    /// Fire damage.
    Burn,
    /// Toxin damage.
    Poison,
}

/// Damage-over-time marker carried by an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageOverTime {
    /// Category of the marker; a new marker replaces an existing one of the same kind.
    pub kind: DotKind,
    /// Damage dealt per second of simulated time.
    pub damage_per_second: f32,
    /// Simulated time left before the marker expires.
    pub remaining: Duration,
}

/// Movement slow applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowStatus {
    /// Speed multiplier in `(0, 1]`.
    pub factor: f32,
    /// Absolute simulation time at which the slow wears off.
    pub until: Duration,
}

/// Authoritative enemy state.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Unique identifier.
    pub id: EnemyId,
    /// Current centre.
    pub position: Position,
    /// Collision radius.
    pub size: f32,
    /// Remaining hit points.
    pub health: Health,
    /// Base movement speed in units per second.
    pub speed: f32,
    /// Gold awarded on kill.
    pub gold_value: u32,
    /// Presentation tint.
    pub color: Color,
    /// Behaviour tag.
    pub kind: EnemyKind,
    /// Boss archetype, if this enemy is a boss.
    pub boss: Option<BossKind>,
    /// Boss phase in `1..=3`; `0` for regular enemies.
    pub boss_phase: u8,
    /// Damage absorbed before health is reduced.
    pub shield_strength: f32,
    /// Absolute simulation time until which the enemy cannot move.
    pub frozen_until: Option<Duration>,
    /// Active slow, if any.
    pub slow: Option<SlowStatus>,
    /// Active burn/poison markers.
    pub damage_over_time: Vec<DamageOverTime>,
    /// Marks the high-value microbe variant.
    pub is_special: bool,
    /// Wave that spawned the enemy.
    pub wave: u32,
    /// Base integrity removed when the enemy reaches the centre.
    pub leak_damage: u32,
    /// Time of the last enemy shot, for ranged kinds.
    pub last_fired: Option<Duration>,
}

impl Enemy {
    /// Creates a regular enemy with the unscaled statistics of its archetype.
    #[must_use]
    pub fn new(id: EnemyId, kind: EnemyKind, position: Position) -> Self {
        let profile = kind.profile();
        Self {
            id,
            position,
            size: profile.size,
            health: Health::new(profile.health),
            speed: profile.speed,
            gold_value: profile.gold_value,
            color: profile.color,
            kind,
            boss: None,
            boss_phase: 0,
            shield_strength: profile.shield,
            frozen_until: None,
            slow: None,
            damage_over_time: Vec::new(),
            is_special: false,
            wave: 0,
            leak_damage: profile.leak_damage,
            last_fired: None,
        }
    }

    /// Creates a boss in its first phase. `kind` only tags the boss for
    /// wave bookkeeping.
    #[must_use]
    pub fn new_boss(id: EnemyId, boss: BossKind, kind: EnemyKind, position: Position) -> Self {
        let profile = boss.profile();
        Self {
            size: profile.size,
            health: Health::new(profile.health),
            speed: profile.speed,
            gold_value: profile.gold_value,
            color: profile.color,
            boss: Some(boss),
            boss_phase: 1,
            shield_strength: profile.shield,
            leak_damage: profile.leak_damage,
            ..Self::new(id, kind, position)
        }
    }

    /// Reports whether the enemy still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Reports whether the enemy is a boss.
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    /// Reports whether the enemy is frozen at `now`.
    #[must_use]
    pub fn is_frozen(&self, now: Duration) -> bool {
        self.frozen_until.is_some_and(|until| now < until)
    }

    /// Ranged weapon carried by the enemy, if any.
    #[must_use]
    pub fn weapon(&self) -> Option<EnemyWeapon> {
        match self.boss {
            Some(boss) => boss.profile().weapon,
            None => self.kind.profile().weapon,
        }
    }
}

/// Stat modifiers granted by nearby complementary towers, as fractions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SynergyBonuses {
    /// Additional damage fraction.
    pub damage: f32,
    /// Additional range fraction.
    pub range: f32,
    /// Additional fire-rate fraction.
    pub fire_rate: f32,
}

impl SynergyBonuses {
    /// Sums two bonus sets component-wise.
    #[must_use]
    pub fn combine(self, other: SynergyBonuses) -> Self {
        Self {
            damage: self.damage + other.damage,
            range: self.range + other.range,
            fire_rate: self.fire_rate + other.fire_rate,
        }
    }
}

/// Authoritative tower state. Towers always live inside a [`TowerSlot`].
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    /// Unique identifier.
    pub id: TowerId,
    /// Centre, equal to the owning slot position.
    pub position: Position,
    /// Collision radius.
    pub size: f32,
    /// Upgrade level starting at 1.
    pub level: u32,
    /// Base targeting range in world units.
    pub range: f32,
    /// Base damage per bullet.
    pub damage: f32,
    /// Base interval between shots.
    pub fire_rate: Duration,
    /// Simulation time of the last shot.
    pub last_fired: Option<Duration>,
    /// Structural hit points.
    pub health: Health,
    /// Armor that mitigates enemy projectile damage.
    pub wall_strength: f32,
    /// Attack or economy tower.
    pub tower_type: TowerType,
    /// Optional specialization.
    pub class: Option<TowerClass>,
    /// Index into the bullet type table.
    pub bullet_type: usize,
    /// Bullet upgrade level starting at 1.
    pub bullet_level: u32,
    /// Bonuses recomputed every tick from nearby towers.
    pub synergy: SynergyBonuses,
    /// Explicit targeting override.
    pub targeting: Option<TargetingStrategy>,
    /// Shield reserve owned by shield generators.
    pub shield_pool: f32,
    /// Wall-strength bonus projected onto this tower during the current tick.
    pub shield_bonus: f32,
    /// Time accumulated toward the next repair pulse.
    pub repair_timer: Duration,
    /// Time accumulated toward the next income payout.
    pub income_timer: Duration,
}

impl Tower {
    /// Creates a level one attack tower with the base statistics of `config`.
    #[must_use]
    pub fn new(id: TowerId, position: Position, config: &TowerConfig) -> Self {
        Self {
            id,
            position,
            size: config.size,
            level: 1,
            range: config.range,
            damage: config.damage,
            fire_rate: config.fire_rate(),
            last_fired: None,
            health: Health::new(config.health),
            wall_strength: config.wall_strength,
            tower_type: TowerType::Attack,
            class: None,
            bullet_type: 0,
            bullet_level: 1,
            synergy: SynergyBonuses::default(),
            targeting: None,
            shield_pool: 0.0,
            shield_bonus: 0.0,
            repair_timer: Duration::ZERO,
            income_timer: Duration::ZERO,
        }
    }

    /// Targeting strategy in effect, honouring an explicit override.
    #[must_use]
    pub fn strategy(&self) -> TargetingStrategy {
        self.targeting.unwrap_or_else(|| match self.class {
            Some(class) => class.descriptor().default_strategy,
            None => TargetingStrategy::Nearest,
        })
    }

    /// Wall strength including the projected shield bonus.
    #[must_use]
    pub fn effective_armor(&self) -> f32 {
        (self.wall_strength + self.shield_bonus).max(0.0)
    }

    /// Reports whether the tower can fire bullets.
    #[must_use]
    pub fn is_attacker(&self) -> bool {
        self.tower_type == TowerType::Attack
            && self
                .class
                .map_or(true, |class| class.descriptor().support.is_none())
    }
}

/// Bullet state. Inactive bullets are owned by the pool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bullet {
    /// Identifier unique among live bullets.
    pub id: BulletId,
    /// Current centre.
    pub position: Position,
    /// Collision radius.
    pub size: f32,
    /// Travel speed in units per second.
    pub speed: f32,
    /// Damage dealt on impact.
    pub damage: f32,
    /// Unit travel direction.
    pub direction: Vec2,
    /// Presentation tint.
    pub color: Color,
    /// Index into the bullet type table.
    pub type_index: usize,
    /// Special effect applied on impact.
    pub effect: Option<BulletEffect>,
    /// Remaining lifetime.
    pub life: Duration,
    /// Tower that fired the bullet, if any.
    pub source: Option<TowerId>,
    /// Area damage radius applied around the impact point.
    pub splash_radius: f32,
    /// Additional enemies the bullet may pass through.
    pub pierce_remaining: u8,
    /// Enemies already struck, excluded from later collision searches.
    pub struck: Vec<EnemyId>,
}

/// Visual category of a transient effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Flash at a tower barrel.
    MuzzleFlash,
    /// Bullet impact.
    #[default]
    Hit,
    /// Splash detonation.
    Explosion,
    /// Lightning arc between chained enemies.
    ChainArc,
    /// Frost burst after a freeze.
    Frost,
    /// Bright centre of a mine explosion.
    MineCore,
    /// Main ring of a mine explosion.
    MineBlast,
    /// Lingering smoke after a mine explosion.
    MineSmoke,
    /// Shield generator aura.
    ShieldAura,
    /// Repair pulse.
    Repair,
    /// Enemy death.
    Death,
}

/// Transient visual marker counted down to removal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Effect {
    /// Identifier unique among live effects.
    pub id: EffectId,
    /// Visual category.
    pub kind: EffectKind,
    /// Centre.
    pub position: Position,
    /// Display radius.
    pub radius: f32,
    /// Remaining lifetime.
    pub life: Duration,
    /// Lifetime at creation.
    pub max_life: Duration,
    /// Presentation tint.
    pub color: Color,
}

/// Area-denial device that explodes once on contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mine {
    /// Unique identifier.
    pub id: MineId,
    /// Centre.
    pub position: Position,
    /// Trigger and damage radius.
    pub radius: f32,
    /// Damage at the centre of the blast.
    pub damage: f32,
}

/// Fixed map location that can hold one tower.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSlot {
    /// Slot index.
    pub index: SlotIndex,
    /// Fixed centre.
    pub position: Position,
    /// Whether towers may be built here.
    pub unlocked: bool,
    /// Positional bonus category.
    pub terrain: SlotTerrain,
    /// Tower owned by the slot.
    pub tower: Option<Tower>,
}

/// Upgrade paths available to a built tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    /// Raises tower level, damage, range, and health.
    Tower,
    /// Raises the bullet level damage multiplier.
    Bullet,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Creates an enemy on the map.
    SpawnEnemy {
        /// Behaviour tag of the enemy.
        kind: EnemyKind,
        /// Boss archetype, if any.
        boss: Option<BossKind>,
        /// Whether to use the microbe variant.
        special: bool,
        /// Spawn position on the rim.
        position: Position,
        /// Wave the enemy belongs to.
        wave: u32,
        /// Health multiplier derived from wave difficulty.
        health_multiplier: f32,
    },
    /// Builds a tower into an unlocked, empty slot.
    BuildTower {
        /// Target slot.
        slot: SlotIndex,
        /// Attack or economy tower.
        tower_type: TowerType,
        /// Optional specialization.
        class: Option<TowerClass>,
        /// Bullet type index.
        bullet_type: usize,
    },
    /// Upgrades the tower in a slot.
    UpgradeTower {
        /// Slot whose tower is upgraded.
        slot: SlotIndex,
        /// Upgrade path.
        upgrade: UpgradeKind,
    },
    /// Removes the tower in a slot for a partial refund.
    DismantleTower {
        /// Slot whose tower is removed.
        slot: SlotIndex,
    },
    /// Unlocks a slot for building.
    UnlockSlot {
        /// Slot to unlock.
        slot: SlotIndex,
    },
    /// Places a mine at the provided position.
    PlaceMine {
        /// Centre of the mine.
        position: Position,
    },
    /// Overrides or clears the targeting strategy of a tower.
    SetTargeting {
        /// Slot whose tower is configured.
        slot: SlotIndex,
        /// Strategy override; `None` restores the class default.
        strategy: Option<TargetingStrategy>,
    },
}

/// Reasons a player command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// The referenced slot does not exist.
    UnknownSlot,
    /// The slot has not been unlocked.
    SlotLocked,
    /// The slot was already unlocked.
    SlotAlreadyUnlocked,
    /// The slot already holds a tower.
    SlotOccupied,
    /// The slot holds no tower.
    SlotEmpty,
    /// The player cannot afford the action.
    InsufficientGold,
    /// The tower reached its maximum level.
    MaxLevel,
    /// Economy and support towers have no bullets to upgrade or target with.
    NotAnAttacker,
    /// The mine lies outside the playable ring.
    MineOutOfBounds,
    /// The mine overlaps another mine.
    MineTooClose,
    /// The game has ended.
    GameOver,
}

/// Origin of a gold payout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GoldSource {
    /// Enemy kill bounty.
    Kill,
    /// Economy tower income.
    Income,
    /// Dismantle refund.
    Refund,
}

/// Events broadcast by the world and systems after mutations are committed.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier of the new enemy.
        enemy: EnemyId,
        /// Behaviour tag.
        kind: EnemyKind,
        /// Boss archetype, if any.
        boss: Option<BossKind>,
        /// Whether the microbe variant was used.
        special: bool,
        /// Wave that spawned the enemy.
        wave: u32,
    },
    /// Reports an enemy whose health reached zero.
    EnemyKilled {
        /// Identifier of the killed enemy.
        enemy: EnemyId,
        /// Behaviour tag.
        kind: EnemyKind,
        /// Wave that spawned the enemy.
        wave: u32,
        /// Gold awarded.
        gold: u32,
        /// Whether the enemy was a boss.
        boss: bool,
    },
    /// Reports an enemy that reached the map centre.
    EnemyLeaked {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Wave that spawned the enemy.
        wave: u32,
        /// Base integrity removed.
        damage: u32,
    },
    /// Announces a boss entering a new phase.
    BossPhaseChanged {
        /// Identifier of the boss.
        enemy: EnemyId,
        /// Boss archetype.
        boss: BossKind,
        /// New phase.
        phase: u8,
    },
    /// Confirms that a tower was built.
    TowerBuilt {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Slot that holds the tower.
        slot: SlotIndex,
        /// Specialization, if any.
        class: Option<TowerClass>,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms a purchased upgrade.
    TowerUpgraded {
        /// Upgraded tower.
        tower: TowerId,
        /// Slot that holds the tower.
        slot: SlotIndex,
        /// Upgrade path.
        upgrade: UpgradeKind,
        /// New level on the upgraded path.
        level: u32,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a tower was dismantled.
    TowerDismantled {
        /// Removed tower.
        tower: TowerId,
        /// Slot that held the tower.
        slot: SlotIndex,
        /// Gold refunded.
        refund: u32,
    },
    /// Reports a tower shot.
    TowerFired {
        /// Firing tower.
        tower: TowerId,
        /// Targeted enemy.
        target: EnemyId,
        /// Bullet that was created.
        bullet: BulletId,
    },
    /// Reports damage applied to a tower.
    TowerDamaged {
        /// Damaged tower.
        tower: TowerId,
        /// Slot that holds the tower.
        slot: SlotIndex,
        /// Hit points removed after mitigation.
        amount: f32,
    },
    /// Reports a tower destroyed by enemy fire.
    TowerDestroyed {
        /// Destroyed tower.
        tower: TowerId,
        /// Slot that held the tower.
        slot: SlotIndex,
    },
    /// Reports a tower healed by a repair station.
    TowerRepaired {
        /// Repaired tower.
        tower: TowerId,
        /// Slot that holds the tower.
        slot: SlotIndex,
        /// Hit points restored.
        amount: f32,
    },
    /// Confirms that a slot was unlocked.
    SlotUnlocked {
        /// Unlocked slot.
        slot: SlotIndex,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a mine was placed.
    MinePlaced {
        /// Identifier of the mine.
        mine: MineId,
        /// Centre of the mine.
        position: Position,
    },
    /// Reports a mine explosion.
    MineDetonated {
        /// Identifier of the consumed mine.
        mine: MineId,
        /// Number of enemies damaged.
        hits: u32,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// Wave number starting at 1.
        wave: u32,
        /// Enemies that must be removed to finish the wave.
        required: u32,
    },
    /// Announces that every enemy of the wave has been spawned.
    WaveAllSpawned {
        /// Wave number.
        wave: u32,
    },
    /// Announces that a wave was cleared.
    WaveCompleted {
        /// Wave number.
        wave: u32,
        /// Whether no enemy of the wave leaked.
        perfect: bool,
    },
    /// Reports gold added to the treasury.
    GoldEarned {
        /// Amount of gold.
        amount: u32,
        /// Reason for the payout.
        source: GoldSource,
    },
    /// Reports damage to the base at the map centre.
    BaseDamaged {
        /// Integrity removed.
        amount: u32,
        /// Integrity left.
        remaining: u32,
    },
    /// Announces that the base fell and the game ended.
    BaseDestroyed,
    /// Reports a rejected player command.
    CommandRejected {
        /// Slot referenced by the command, if any.
        slot: Option<SlotIndex>,
        /// Specific reason the command failed.
        reason: RejectReason,
    },
}

impl Event {
    /// Maps the event onto the reward taxonomy consumed by mission trackers.
    #[must_use]
    pub fn reward(&self) -> Option<(RewardKind, RewardPayload)> {
        match self {
            Event::WaveCompleted { perfect, .. } => Some((
                RewardKind::WaveCompleted,
                RewardPayload {
                    amount: None,
                    perfect_wave: Some(*perfect),
                },
            )),
            Event::EnemyKilled { .. } => Some((RewardKind::EnemyKilled, RewardPayload::default())),
            Event::TowerBuilt { cost, .. } => Some((
                RewardKind::TowerBuilt,
                RewardPayload {
                    amount: Some(*cost),
                    perfect_wave: None,
                },
            )),
            Event::GoldEarned { amount, .. } => Some((
                RewardKind::GoldEarned,
                RewardPayload {
                    amount: Some(*amount),
                    perfect_wave: None,
                },
            )),
            Event::TowerUpgraded { cost, .. } => Some((
                RewardKind::UpgradePurchased,
                RewardPayload {
                    amount: Some(*cost),
                    perfect_wave: None,
                },
            )),
            _ => None,
        }
    }
}

/// Event names understood by reward, mission, and achievement trackers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// A wave was cleared.
    WaveCompleted,
    /// An enemy was killed.
    EnemyKilled,
    /// A tower was built.
    TowerBuilt,
    /// Gold was earned.
    GoldEarned,
    /// An upgrade was purchased.
    UpgradePurchased,
}

impl RewardKind {
    /// Canonical string name of the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WaveCompleted => "wave_completed",
            Self::EnemyKilled => "enemy_killed",
            Self::TowerBuilt => "tower_built",
            Self::GoldEarned => "gold_earned",
            Self::UpgradePurchased => "upgrade_purchased",
        }
    }
}

/// Optional payload attached to reward events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPayload {
    /// Gold amount involved, when relevant.
    pub amount: Option<u32>,
    /// Whether a completed wave had no leaks.
    pub perfect_wave: Option<bool>,
}
