//! Static gameplay tables: enemy archetypes, bosses, tower classes, and bullet types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Color, TargetingStrategy};

/// Behaviour tags shared by every regular enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Balanced walker available from the first wave.
    Basic,
    /// Fast, fragile runner.
    Scout,
    /// Slow armoured enemy that shoots back at towers.
    Tank,
    /// Evasive enemy worth extra gold.
    Ghost,
    /// Tiny enemy that arrives in large numbers.
    Swarm,
}

/// Ranged weapon carried by tanks and bosses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyWeapon {
    /// Maximum distance to a tower centre.
    pub range: f32,
    /// Damage dealt before armor mitigation.
    pub damage: f32,
    /// Minimum time between shots in milliseconds.
    pub cooldown_ms: u64,
    /// Projectile speed in units per second.
    pub projectile_speed: f32,
}

impl EnemyWeapon {
    /// Minimum time between two shots.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Base statistics of an enemy archetype before wave scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProfile {
    /// Starting health.
    pub health: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Collision radius.
    pub size: f32,
    /// Gold awarded on kill.
    pub gold_value: u32,
    /// Presentation tint.
    pub color: Color,
    /// Starting shield strength.
    pub shield: f32,
    /// Base integrity removed on leak.
    pub leak_damage: u32,
    /// Ranged weapon, if the archetype shoots.
    pub weapon: Option<EnemyWeapon>,
}

impl EnemyKind {
    /// Every regular archetype in unlock order.
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Basic,
        EnemyKind::Scout,
        EnemyKind::Tank,
        EnemyKind::Ghost,
        EnemyKind::Swarm,
    ];

    /// Base statistics of the archetype.
    #[must_use]
    pub const fn profile(self) -> EnemyProfile {
        match self {
            EnemyKind::Basic => EnemyProfile {
                health: 50.0,
                speed: 40.0,
                size: 10.0,
                gold_value: 5,
                color: Color::from_rgb(0x4c, 0xaf, 0x50),
                shield: 0.0,
                leak_damage: 1,
                weapon: None,
            },
            EnemyKind::Scout => EnemyProfile {
                health: 30.0,
                speed: 75.0,
                size: 8.0,
                gold_value: 6,
                color: Color::from_rgb(0xff, 0xc1, 0x07),
                shield: 0.0,
                leak_damage: 1,
                weapon: None,
            },
            EnemyKind::Tank => EnemyProfile {
                health: 180.0,
                speed: 22.0,
                size: 16.0,
                gold_value: 15,
                color: Color::from_rgb(0x60, 0x7d, 0x8b),
                shield: 40.0,
                leak_damage: 3,
                weapon: Some(EnemyWeapon {
                    range: 140.0,
                    damage: 8.0,
                    cooldown_ms: 2_000,
                    projectile_speed: 220.0,
                }),
            },
            EnemyKind::Ghost => EnemyProfile {
                health: 40.0,
                speed: 55.0,
                size: 9.0,
                gold_value: 10,
                color: Color::from_rgb(0xb3, 0x9d, 0xdb),
                shield: 0.0,
                leak_damage: 2,
                weapon: None,
            },
            EnemyKind::Swarm => EnemyProfile {
                health: 18.0,
                speed: 60.0,
                size: 6.0,
                gold_value: 2,
                color: Color::from_rgb(0xe9, 0x1e, 0x63),
                shield: 0.0,
                leak_damage: 1,
                weapon: None,
            },
        }
    }

    /// First wave in which the formula composition includes the archetype.
    #[must_use]
    pub const fn unlock_wave(self) -> u32 {
        match self {
            EnemyKind::Basic => 1,
            EnemyKind::Scout => 3,
            EnemyKind::Tank => 5,
            EnemyKind::Ghost => 7,
            EnemyKind::Swarm => 9,
        }
    }
}

/// Boss archetypes spawned at milestone waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossKind {
    /// Heavily shielded artillery boss.
    Warlord,
    /// Faster boss with a lighter shield.
    Broodmother,
}

/// Base statistics of a boss archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossProfile {
    /// Starting health.
    pub health: f32,
    /// Movement speed in phase one.
    pub speed: f32,
    /// Collision radius.
    pub size: f32,
    /// Gold awarded on kill.
    pub gold_value: u32,
    /// Presentation tint.
    pub color: Color,
    /// Starting shield strength.
    pub shield: f32,
    /// Base integrity removed on leak.
    pub leak_damage: u32,
    /// Ranged weapon.
    pub weapon: Option<EnemyWeapon>,
}

impl BossKind {
    /// Bosses in rotation order.
    pub const ALL: [BossKind; 2] = [BossKind::Warlord, BossKind::Broodmother];

    /// Base statistics of the boss.
    #[must_use]
    pub const fn profile(self) -> BossProfile {
        match self {
            BossKind::Warlord => BossProfile {
                health: 1_500.0,
                speed: 18.0,
                size: 28.0,
                gold_value: 150,
                color: Color::from_rgb(0xb7, 0x1c, 0x1c),
                shield: 200.0,
                leak_damage: 10,
                weapon: Some(EnemyWeapon {
                    range: 180.0,
                    damage: 20.0,
                    cooldown_ms: 1_500,
                    projectile_speed: 260.0,
                }),
            },
            BossKind::Broodmother => BossProfile {
                health: 1_200.0,
                speed: 24.0,
                size: 24.0,
                gold_value: 120,
                color: Color::from_rgb(0x88, 0x0e, 0x4f),
                shield: 100.0,
                leak_damage: 10,
                weapon: Some(EnemyWeapon {
                    range: 150.0,
                    damage: 12.0,
                    cooldown_ms: 1_000,
                    projectile_speed: 240.0,
                }),
            },
        }
    }
}

/// Speed multiplier applied to a boss in the given phase.
#[must_use]
pub fn boss_phase_speed_multiplier(phase: u8) -> f32 {
    match phase {
        0 | 1 => 1.0,
        2 => 1.2,
        _ => 1.45,
    }
}

/// Boss phase for the given remaining health fraction.
#[must_use]
pub fn boss_phase_for(fraction: f32) -> u8 {
    if fraction > 2.0 / 3.0 {
        1
    } else if fraction > 1.0 / 3.0 {
        2
    } else {
        3
    }
}

/// Specializations available when building an attack tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerClass {
    /// Long range, slow, heavy hits.
    Sniper,
    /// Rapid twin-barrel fire.
    Gatling,
    /// Slow artillery with splash damage.
    Mortar,
    /// Focused beam that prioritises the greatest threat.
    Laser,
    /// Short range, very rapid fire.
    Flamethrower,
    /// Arcing electricity aimed at enemies near the centre.
    Tesla,
    /// Projects armor onto nearby towers.
    ShieldGenerator,
    /// Heals nearby damaged towers.
    RepairStation,
}

/// Passive role of a support tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SupportRole {
    /// Regenerating shield projected as extra wall strength.
    Shield {
        /// Maximum shield pool.
        capacity: f32,
        /// Pool regenerated per second.
        regen_per_second: f32,
        /// Wall-strength bonus at a full pool.
        bonus: f32,
        /// Projection radius.
        radius: f32,
    },
    /// Periodic repair pulse.
    Repair {
        /// Health restored per pulse.
        rate: f32,
        /// Time between pulses in milliseconds.
        interval_ms: u64,
        /// Pulse radius.
        radius: f32,
    },
}

/// Row of the tower specialization table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerClassDescriptor {
    /// Gold cost on top of the base tower cost.
    pub cost: u32,
    /// Damage multiplier.
    pub damage_multiplier: f32,
    /// Range multiplier.
    pub range_multiplier: f32,
    /// Fire interval multiplier; values below one fire faster.
    pub fire_rate_multiplier: f32,
    /// Splash radius applied by the class, if any.
    pub area_of_effect: Option<f32>,
    /// Bullets fired per shot.
    pub projectiles: u8,
    /// Strategy used unless the player overrides it.
    pub default_strategy: TargetingStrategy,
    /// Passive support role, if any.
    pub support: Option<SupportRole>,
}

const fn attacker(
    cost: u32,
    damage_multiplier: f32,
    range_multiplier: f32,
    fire_rate_multiplier: f32,
    default_strategy: TargetingStrategy,
) -> TowerClassDescriptor {
    TowerClassDescriptor {
        cost,
        damage_multiplier,
        range_multiplier,
        fire_rate_multiplier,
        area_of_effect: None,
        projectiles: 1,
        default_strategy,
        support: None,
    }
}

impl TowerClass {
    /// Every specialization in table order.
    pub const ALL: [TowerClass; 8] = [
        TowerClass::Sniper,
        TowerClass::Gatling,
        TowerClass::Mortar,
        TowerClass::Laser,
        TowerClass::Flamethrower,
        TowerClass::Tesla,
        TowerClass::ShieldGenerator,
        TowerClass::RepairStation,
    ];

    /// Looks up the specialization table row.
    #[must_use]
    pub const fn descriptor(self) -> TowerClassDescriptor {
        match self {
            TowerClass::Sniper => attacker(70, 2.5, 1.8, 2.0, TargetingStrategy::HighestHp),
            TowerClass::Gatling => TowerClassDescriptor {
                projectiles: 2,
                ..attacker(50, 0.5, 0.9, 0.35, TargetingStrategy::Fastest)
            },
            TowerClass::Mortar => TowerClassDescriptor {
                area_of_effect: Some(60.0),
                ..attacker(90, 1.6, 1.3, 2.5, TargetingStrategy::LowestHp)
            },
            TowerClass::Laser => attacker(80, 1.2, 1.1, 0.8, TargetingStrategy::ThreatAssessment),
            TowerClass::Flamethrower => attacker(60, 0.4, 0.6, 0.25, TargetingStrategy::Nearest),
            TowerClass::Tesla => attacker(100, 0.9, 1.0, 1.2, TargetingStrategy::ClosestToExit),
            TowerClass::ShieldGenerator => TowerClassDescriptor {
                support: Some(SupportRole::Shield {
                    capacity: 100.0,
                    regen_per_second: 10.0,
                    bonus: 30.0,
                    radius: 150.0,
                }),
                ..attacker(110, 0.0, 1.0, 1.0, TargetingStrategy::Nearest)
            },
            TowerClass::RepairStation => TowerClassDescriptor {
                support: Some(SupportRole::Repair {
                    rate: 15.0,
                    interval_ms: 1_000,
                    radius: 150.0,
                }),
                ..attacker(100, 0.0, 1.0, 1.0, TargetingStrategy::Nearest)
            },
        }
    }
}

/// Special effect applied when a bullet strikes an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BulletEffect {
    /// Multiplies movement speed for a while.
    Slow {
        /// Speed multiplier in `(0, 1]`.
        factor: f32,
        /// Duration in milliseconds.
        duration_ms: u64,
    },
    /// Stops movement for a while.
    Freeze {
        /// Duration in milliseconds.
        duration_ms: u64,
    },
    /// Fire damage over time.
    Burn {
        /// Damage per second.
        damage_per_second: f32,
        /// Duration in milliseconds.
        duration_ms: u64,
    },
    /// Toxin damage over time.
    Poison {
        /// Damage per second.
        damage_per_second: f32,
        /// Duration in milliseconds.
        duration_ms: u64,
    },
    /// Jumps to nearby enemies with decaying damage.
    Chain {
        /// Jump radius.
        radius: f32,
        /// Maximum number of secondary targets.
        max_jumps: u8,
        /// Damage multiplier applied per jump.
        falloff: f32,
    },
    /// Passes through additional enemies.
    Pierce {
        /// Additional enemies the bullet may strike.
        hits: u8,
    },
}

/// Row of the bullet type table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletTypeSpec {
    /// Display name.
    pub name: String,
    /// Damage multiplier.
    pub damage_multiplier: f32,
    /// Fire interval multiplier.
    pub fire_rate_multiplier: f32,
    /// Bullet speed multiplier.
    #[serde(default = "unit_multiplier")]
    pub speed_multiplier: f32,
    /// Effect applied on impact.
    #[serde(default)]
    pub effect: Option<BulletEffect>,
    /// Presentation tint.
    pub color: Color,
}

fn unit_multiplier() -> f32 {
    1.0
}

/// Bullet type used when a tower references an index missing from the table.
pub static NEUTRAL_BULLET_TYPE: BulletTypeSpec = BulletTypeSpec {
    name: String::new(),
    damage_multiplier: 1.0,
    fire_rate_multiplier: 1.0,
    speed_multiplier: 1.0,
    effect: None,
    color: Color::from_rgb(0xff, 0xff, 0xff),
};

/// Indexed bullet type table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletTypeTable {
    /// Rows addressed by bullet type index.
    pub types: Vec<BulletTypeSpec>,
}

impl BulletTypeTable {
    /// Returns the row at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BulletTypeSpec> {
        self.types.get(index)
    }

    /// Returns the row at `index`, falling back to neutral multipliers.
    #[must_use]
    pub fn resolve(&self, index: usize) -> &BulletTypeSpec {
        self.get(index).unwrap_or(&NEUTRAL_BULLET_TYPE)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Reports whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for BulletTypeTable {
    fn default() -> Self {
        let row = |name: &str, damage, fire_rate, speed, effect, color| BulletTypeSpec {
            name: name.to_owned(),
            damage_multiplier: damage,
            fire_rate_multiplier: fire_rate,
            speed_multiplier: speed,
            effect,
            color,
        };

        Self {
            types: vec![
                row("standard", 1.0, 1.0, 1.0, None, Color::from_rgb(0xff, 0xeb, 0x3b)),
                row(
                    "frost",
                    0.8,
                    1.1,
                    1.0,
                    Some(BulletEffect::Freeze { duration_ms: 1_500 }),
                    Color::from_rgb(0x81, 0xd4, 0xfa),
                ),
                row(
                    "incendiary",
                    0.9,
                    1.0,
                    1.0,
                    Some(BulletEffect::Burn {
                        damage_per_second: 8.0,
                        duration_ms: 3_000,
                    }),
                    Color::from_rgb(0xff, 0x57, 0x22),
                ),
                row(
                    "venom",
                    0.9,
                    1.0,
                    1.0,
                    Some(BulletEffect::Poison {
                        damage_per_second: 5.0,
                        duration_ms: 5_000,
                    }),
                    Color::from_rgb(0x8b, 0xc3, 0x4a),
                ),
                row(
                    "arc",
                    0.85,
                    1.2,
                    1.0,
                    Some(BulletEffect::Chain {
                        radius: 90.0,
                        max_jumps: 3,
                        falloff: 0.6,
                    }),
                    Color::from_rgb(0x7c, 0x4d, 0xff),
                ),
                row(
                    "piercer",
                    0.9,
                    1.15,
                    1.4,
                    Some(BulletEffect::Pierce { hits: 2 }),
                    Color::from_rgb(0xec, 0xef, 0xf1),
                ),
                row(
                    "cryo",
                    0.9,
                    1.0,
                    1.0,
                    Some(BulletEffect::Slow {
                        factor: 0.5,
                        duration_ms: 2_000,
                    }),
                    Color::from_rgb(0x4d, 0xd0, 0xe1),
                ),
            ],
        }
    }
}

/// Single line of a wave composition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Archetype to spawn.
    pub enemy_type: EnemyKind,
    /// Number of enemies to spawn.
    pub count: u32,
    /// Delay between spawns of this entry; the scheduler interval when absent.
    #[serde(default)]
    pub spawn_delay_ms: Option<u64>,
    /// Boss archetype; each spawned enemy of the entry becomes this boss.
    #[serde(default)]
    pub boss: Option<BossKind>,
}

impl WaveEntry {
    /// Creates an entry using the scheduler default delay.
    #[must_use]
    pub const fn new(enemy_type: EnemyKind, count: u32) -> Self {
        Self {
            enemy_type,
            count,
            spawn_delay_ms: None,
            boss: None,
        }
    }
}
