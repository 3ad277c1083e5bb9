//! Tunable simulation parameters loadable from TOML.
//!
//! Every section carries `#[serde(default)]` so a configuration file only has
//! to spell out the values it changes. Durations are stored as millisecond
//! integers and exposed through `Duration` accessors.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    tables::{BossKind, BulletTypeTable, EnemyKind, WaveEntry},
    SlotTerrain,
};

/// Errors raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds a value the simulation cannot run with.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Root configuration of the combat simulation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Global seed used to derive per-wave random streams.
    pub seed: u64,
    /// Map geometry and slot layout.
    pub arena: ArenaConfig,
    /// Spatial hash parameters.
    pub spatial: SpatialConfig,
    /// Wave scheduler cadence and scaling.
    pub spawning: SpawningConfig,
    /// Special microbe variant parameters.
    pub microbe: MicrobeConfig,
    /// Tower costs and base statistics.
    pub towers: TowerConfig,
    /// Bullet and effect parameters.
    pub combat: CombatConfig,
    /// Mine parameters.
    pub mines: MineConfig,
    /// Starting gold and passive income.
    pub economy: EconomyConfig,
    /// Bullet type table.
    pub bullet_types: BulletTypeTable,
    /// Explicit wave compositions overriding the formula fallback.
    pub waves: WaveCompositionTable,
    /// Fixed-step driver cadence.
    pub game_loop: LoopConfig,
}

impl SimulationConfig {
    /// Parses and validates a configuration from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value lies within the range the systems rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spatial.cell_size > 0.0) {
            return Err(invalid("spatial.cell_size", "must be greater than zero"));
        }
        if !(self.arena.goal_radius >= 0.0) {
            return Err(invalid("arena.goal_radius", "must not be negative"));
        }
        if !(self.arena.radius > self.arena.goal_radius) {
            return Err(invalid(
                "arena.radius",
                format!(
                    "must exceed the goal radius ({})",
                    self.arena.goal_radius
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.microbe.spawn_chance) {
            return Err(invalid("microbe.spawn_chance", "must lie within [0, 1]"));
        }
        if self.spawning.spawn_interval_ms == 0 {
            return Err(invalid("spawning.spawn_interval_ms", "must be non-zero"));
        }
        if self.spawning.enemy_wave_increase == 0 {
            return Err(invalid("spawning.enemy_wave_increase", "must be non-zero"));
        }
        if self.towers.fire_rate_ms == 0 {
            return Err(invalid("towers.fire_rate_ms", "must be non-zero"));
        }
        if self.towers.max_level == 0 || self.towers.max_bullet_level == 0 {
            return Err(invalid("towers.max_level", "levels start at one"));
        }
        if !(0.0..=1.0).contains(&self.towers.dismantle_refund) {
            return Err(invalid("towers.dismantle_refund", "must lie within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.mines.edge_damage_ratio) {
            return Err(invalid("mines.edge_damage_ratio", "must lie within [0, 1]"));
        }
        if !(self.mines.radius > 0.0) {
            return Err(invalid("mines.radius", "must be greater than zero"));
        }
        if self.game_loop.step_ms == 0 {
            return Err(invalid("game_loop.step_ms", "must be non-zero"));
        }
        if self.game_loop.max_steps_per_frame == 0 {
            return Err(invalid("game_loop.max_steps_per_frame", "must be non-zero"));
        }
        if self.economy.income_interval_ms == 0 {
            return Err(invalid("economy.income_interval_ms", "must be non-zero"));
        }
        for ring in &self.arena.slot_rings {
            if ring.radius <= self.arena.goal_radius || ring.radius >= self.arena.radius {
                return Err(invalid(
                    "arena.slot_rings.radius",
                    format!("ring at {} lies outside the playable band", ring.radius),
                ));
            }
        }
        for row in &self.bullet_types.types {
            if !(row.fire_rate_multiplier > 0.0) {
                return Err(invalid(
                    "bullet_types.fire_rate_multiplier",
                    format!("bullet type `{}` must fire at a positive rate", row.name),
                ));
            }
        }
        Ok(())
    }
}

/// Map geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Radius of the rim where enemies spawn.
    pub radius: f32,
    /// Radius of the base at the centre; reaching it counts as a leak.
    pub goal_radius: f32,
    /// Distance beyond the rim at which stray bullets are discarded.
    pub out_of_bounds_margin: f32,
    /// Leak damage the base absorbs before the game ends.
    pub base_integrity: u32,
    /// Concentric rings of tower slots.
    pub slot_rings: Vec<SlotRingConfig>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            radius: 500.0,
            goal_radius: 30.0,
            out_of_bounds_margin: 60.0,
            base_integrity: 20,
            slot_rings: vec![
                SlotRingConfig {
                    radius: 140.0,
                    count: 6,
                    terrain: SlotTerrain::HighGround,
                    unlocked: true,
                },
                SlotRingConfig {
                    radius: 260.0,
                    count: 8,
                    terrain: SlotTerrain::Open,
                    unlocked: true,
                },
                SlotRingConfig {
                    radius: 380.0,
                    count: 6,
                    terrain: SlotTerrain::Chokepoint,
                    unlocked: false,
                },
            ],
        }
    }
}

/// Ring of evenly spaced tower slots around the centre.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotRingConfig {
    /// Distance from the centre.
    pub radius: f32,
    /// Number of slots on the ring.
    pub count: u32,
    /// Terrain shared by the ring's slots.
    #[serde(default)]
    pub terrain: SlotTerrain,
    /// Whether the slots start unlocked.
    #[serde(default)]
    pub unlocked: bool,
}

/// Spatial hash parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Side length of a hash cell.
    pub cell_size: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self { cell_size: 100.0 }
    }
}

/// Wave scheduler cadence and difficulty scaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawningConfig {
    /// Default delay between two spawns.
    pub spawn_interval_ms: u64,
    /// Enemies added per wave by the formula composition.
    pub enemy_wave_increase: u32,
    /// Extra health fraction per wave after the first.
    pub health_growth: f32,
    /// A boss joins every wave that is a multiple of this value; zero disables bosses.
    pub boss_every: u32,
    /// Starts the next wave automatically after the intermission.
    pub auto_start: bool,
    /// Pause between a completed wave and the next one.
    pub intermission_ms: u64,
}

impl SpawningConfig {
    /// Default delay between two spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Pause between waves.
    #[must_use]
    pub const fn intermission(&self) -> Duration {
        Duration::from_millis(self.intermission_ms)
    }
}

impl Default for SpawningConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 800,
            enemy_wave_increase: 5,
            health_growth: 0.15,
            boss_every: 5,
            auto_start: true,
            intermission_ms: 5_000,
        }
    }
}

/// Special microbe variant parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrobeConfig {
    /// Probability that a regular spawn becomes a microbe.
    pub spawn_chance: f64,
    /// Health multiplier applied to microbes.
    pub health_multiplier: f32,
    /// Gold multiplier applied to microbes.
    pub gold_multiplier: u32,
    /// Speed multiplier applied to microbes.
    pub speed_multiplier: f32,
}

impl Default for MicrobeConfig {
    fn default() -> Self {
        Self {
            spawn_chance: 0.05,
            health_multiplier: 0.4,
            gold_multiplier: 6,
            speed_multiplier: 1.1,
        }
    }
}

/// Tower costs and base statistics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    /// Cost of a plain attack tower.
    pub base_cost: u32,
    /// Cost of an economy tower.
    pub economy_cost: u32,
    /// Cost of one upgrade level, multiplied by the current level.
    pub upgrade_cost: u32,
    /// Cost of unlocking a slot.
    pub slot_unlock_cost: u32,
    /// Base targeting range.
    pub range: f32,
    /// Base bullet damage.
    pub damage: f32,
    /// Base interval between shots.
    pub fire_rate_ms: u64,
    /// Base structural health.
    pub health: f32,
    /// Base armor.
    pub wall_strength: f32,
    /// Collision radius.
    pub size: f32,
    /// Highest tower level.
    pub max_level: u32,
    /// Highest bullet level.
    pub max_bullet_level: u32,
    /// Damage fraction gained per tower level.
    pub damage_per_level: f32,
    /// Range fraction gained per tower level.
    pub range_per_level: f32,
    /// Health fraction gained per tower level.
    pub health_per_level: f32,
    /// Fraction of invested gold returned on dismantle.
    pub dismantle_refund: f32,
    /// Radius within which complementary classes grant synergy bonuses.
    pub synergy_radius: f32,
}

impl TowerConfig {
    /// Base interval between shots.
    #[must_use]
    pub const fn fire_rate(&self) -> Duration {
        Duration::from_millis(self.fire_rate_ms)
    }
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            base_cost: 50,
            economy_cost: 75,
            upgrade_cost: 40,
            slot_unlock_cost: 100,
            range: 150.0,
            damage: 20.0,
            fire_rate_ms: 1_000,
            health: 200.0,
            wall_strength: 10.0,
            size: 16.0,
            max_level: 5,
            max_bullet_level: 5,
            damage_per_level: 0.25,
            range_per_level: 0.05,
            health_per_level: 0.2,
            dismantle_refund: 0.5,
            synergy_radius: 180.0,
        }
    }
}

/// Bullet and effect parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Base tower bullet speed.
    pub bullet_speed: f32,
    /// Bullet collision radius.
    pub bullet_size: f32,
    /// Bullet lifetime.
    pub bullet_life_ms: u64,
    /// Lifetime of muzzle flashes.
    pub muzzle_life_ms: u64,
    /// Lifetime of impact effects.
    pub hit_life_ms: u64,
    /// Bullets kept in the pool before the first wave.
    pub pool_prewarm: usize,
}

impl CombatConfig {
    /// Bullet lifetime.
    #[must_use]
    pub const fn bullet_life(&self) -> Duration {
        Duration::from_millis(self.bullet_life_ms)
    }

    /// Lifetime of muzzle flashes.
    #[must_use]
    pub const fn muzzle_life(&self) -> Duration {
        Duration::from_millis(self.muzzle_life_ms)
    }

    /// Lifetime of impact effects.
    #[must_use]
    pub const fn hit_life(&self) -> Duration {
        Duration::from_millis(self.hit_life_ms)
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            bullet_speed: 420.0,
            bullet_size: 4.0,
            bullet_life_ms: 2_000,
            muzzle_life_ms: 120,
            hit_life_ms: 200,
            pool_prewarm: 64,
        }
    }
}

/// Mine parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MineConfig {
    /// Trigger and damage radius.
    pub radius: f32,
    /// Damage at the blast centre.
    pub damage: f32,
    /// Fraction of the damage dealt at the rim. `1.0` keeps the blast flat.
    pub edge_damage_ratio: f32,
    /// Gold cost per mine.
    pub cost: u32,
    /// Minimum distance between two mines.
    pub min_spacing: f32,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            radius: 80.0,
            damage: 120.0,
            edge_damage_ratio: 1.0,
            cost: 30,
            min_spacing: 40.0,
        }
    }
}

/// Starting gold and passive income.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Gold available at the start.
    pub starting_gold: u32,
    /// Gold paid by an economy tower per interval.
    pub income_amount: u32,
    /// Interval between economy payouts.
    pub income_interval_ms: u64,
}

impl EconomyConfig {
    /// Interval between economy payouts.
    #[must_use]
    pub const fn income_interval(&self) -> Duration {
        Duration::from_millis(self.income_interval_ms)
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: 300,
            income_amount: 15,
            income_interval_ms: 5_000,
        }
    }
}

/// Fixed-step driver cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Simulated time per step.
    pub step_ms: u64,
    /// Upper bound on steps run for a single frame.
    pub max_steps_per_frame: u32,
}

impl LoopConfig {
    /// Simulated time per step.
    #[must_use]
    pub const fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            step_ms: 16,
            max_steps_per_frame: 5,
        }
    }
}

/// Explicit composition of a single wave as written in TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Wave number starting at 1.
    pub wave: u32,
    /// Ordered spawn entries.
    pub entries: Vec<WaveEntry>,
}

/// Wave compositions keyed by wave number.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<WaveDefinition>", into = "Vec<WaveDefinition>")]
pub struct WaveCompositionTable {
    waves: BTreeMap<u32, Vec<WaveEntry>>,
}

impl WaveCompositionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Composition of `wave`, if one was defined.
    #[must_use]
    pub fn get(&self, wave: u32) -> Option<&[WaveEntry]> {
        self.waves.get(&wave).map(Vec::as_slice)
    }

    /// Defines or replaces the composition of `wave`.
    pub fn insert(&mut self, wave: u32, entries: Vec<WaveEntry>) {
        let _ = self.waves.insert(wave, entries);
    }

    /// Number of explicitly defined waves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether no wave was defined explicitly.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

impl From<Vec<WaveDefinition>> for WaveCompositionTable {
    fn from(definitions: Vec<WaveDefinition>) -> Self {
        let mut table = Self::new();
        for definition in definitions {
            table.insert(definition.wave, definition.entries);
        }
        table
    }
}

impl From<WaveCompositionTable> for Vec<WaveDefinition> {
    fn from(table: WaveCompositionTable) -> Self {
        table
            .waves
            .into_iter()
            .map(|(wave, entries)| WaveDefinition { wave, entries })
            .collect()
    }
}

/// Total number of enemies described by a composition.
#[must_use]
pub fn composition_size(entries: &[WaveEntry]) -> u32 {
    entries.iter().map(|entry| entry.count).sum()
}

/// Reports whether the composition contains at least one boss.
#[must_use]
pub fn composition_has_boss(entries: &[WaveEntry]) -> bool {
    entries.iter().any(|entry| entry.boss.is_some())
}

/// Boss that headlines the given wave in the formula rotation.
#[must_use]
pub fn rotation_boss(wave: u32, boss_every: u32) -> Option<BossKind> {
    if boss_every == 0 || wave == 0 || wave % boss_every != 0 {
        return None;
    }
    let index = ((wave / boss_every - 1) as usize) % BossKind::ALL.len();
    Some(BossKind::ALL[index])
}

/// Archetypes unlocked by the given wave.
pub fn unlocked_kinds(wave: u32) -> impl Iterator<Item = EnemyKind> {
    EnemyKind::ALL
        .into_iter()
        .filter(move |kind| kind.unlock_wave() <= wave)
}
