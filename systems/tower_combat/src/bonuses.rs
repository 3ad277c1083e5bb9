//! Synergy and positioning modifiers plus the derived firing statistics.

use std::time::Duration;

use ring_defence_core::{BulletTypeSpec, SlotTerrain, SynergyBonuses, Tower, TowerClass};

/// Complementary class pairs and the bonus each member receives per partner.
const SYNERGY_PAIRS: [(TowerClass, TowerClass, SynergyBonuses); 6] = [
    (TowerClass::Sniper, TowerClass::Laser, bonus(0.0, 0.10, 0.0)),
    (TowerClass::Sniper, TowerClass::Mortar, bonus(0.10, 0.0, 0.0)),
    (TowerClass::Gatling, TowerClass::Tesla, bonus(0.0, 0.0, 0.10)),
    (TowerClass::Gatling, TowerClass::Flamethrower, bonus(0.0, 0.0, 0.15)),
    (TowerClass::Mortar, TowerClass::Flamethrower, bonus(0.15, 0.0, 0.0)),
    (TowerClass::Laser, TowerClass::Tesla, bonus(0.10, 0.0, 0.0)),
];

/// Upper bound of every summed synergy bonus.
pub const SYNERGY_CAP: SynergyBonuses = bonus(0.30, 0.20, 0.30);

const fn bonus(damage: f32, range: f32, fire_rate: f32) -> SynergyBonuses {
    SynergyBonuses {
        damage,
        range,
        fire_rate,
    }
}

/// Bonus `class` receives from a single nearby `partner`.
#[must_use]
pub fn pair_bonus(class: TowerClass, partner: TowerClass) -> SynergyBonuses {
    SYNERGY_PAIRS
        .iter()
        .find(|(a, b, _)| (*a == class && *b == partner) || (*a == partner && *b == class))
        .map_or_else(SynergyBonuses::default, |(_, _, bonus)| *bonus)
}

/// Clamps each bonus kind to [`SYNERGY_CAP`].
#[must_use]
pub fn cap_synergy(bonuses: SynergyBonuses) -> SynergyBonuses {
    SynergyBonuses {
        damage: bonuses.damage.min(SYNERGY_CAP.damage),
        range: bonuses.range.min(SYNERGY_CAP.range),
        fire_rate: bonuses.fire_rate.min(SYNERGY_CAP.fire_rate),
    }
}

/// Bonus granted by the terrain of the slot a tower stands on.
#[must_use]
pub const fn position_bonus(terrain: SlotTerrain) -> SynergyBonuses {
    match terrain {
        SlotTerrain::Open => bonus(0.0, 0.0, 0.0),
        SlotTerrain::Chokepoint => bonus(0.15, 0.0, 0.0),
        SlotTerrain::HighGround => bonus(0.0, 0.20, 0.0),
    }
}

/// Statistics a tower fires with during the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FiringStats {
    /// Minimum time between shots.
    pub interval: Duration,
    /// Damage carried by each bullet.
    pub damage: f32,
    /// Multiplier applied to the base range.
    pub range_multiplier: f32,
    /// Bullets fired per shot.
    pub projectiles: usize,
    /// Splash radius carried by each bullet.
    pub splash_radius: f32,
}

impl FiringStats {
    /// Derives the firing statistics of `tower`.
    #[must_use]
    pub fn for_tower(tower: &Tower, terrain: SlotTerrain, bullet_type: &BulletTypeSpec) -> Self {
        let position = position_bonus(terrain);
        let bonuses = tower.synergy.combine(position);
        let (class_damage, class_range, class_rate, projectiles, splash) = match tower.class {
            Some(class) => {
                let descriptor = class.descriptor();
                (
                    descriptor.damage_multiplier,
                    descriptor.range_multiplier,
                    descriptor.fire_rate_multiplier,
                    usize::from(descriptor.projectiles.max(1)),
                    descriptor.area_of_effect.unwrap_or(0.0),
                )
            }
            None => (1.0, 1.0, 1.0, 1, 0.0),
        };

        let bullet_level = tower.bullet_level.saturating_sub(1) as f32;
        let interval_factor =
            class_rate * bullet_type.fire_rate_multiplier / (1.0 + bonuses.fire_rate);
        Self {
            interval: scale_duration(tower.fire_rate, interval_factor),
            damage: tower.damage
                * class_damage
                * bullet_type.damage_multiplier
                * (1.0 + 0.1 * bullet_level)
                * (1.0 + bonuses.damage),
            range_multiplier: class_range * (1.0 + bonuses.range),
            projectiles,
            splash_radius: splash,
        }
    }

    /// Reports whether a tower last fired at `last_fired` may fire at `now`.
    #[must_use]
    pub fn is_ready(&self, last_fired: Option<Duration>, now: Duration) -> bool {
        last_fired.map_or(true, |last| now.saturating_sub(last) >= self.interval)
    }
}

fn scale_duration(duration: Duration, factor: f32) -> Duration {
    if !factor.is_finite() || factor <= 0.0 {
        return duration;
    }
    Duration::from_secs_f64(duration.as_secs_f64() * f64::from(factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_defence_core::{Position, TowerConfig, TowerId, NEUTRAL_BULLET_TYPE};

    fn tower(class: Option<TowerClass>) -> Tower {
        Tower {
            class,
            ..Tower::new(TowerId::new(0), Position::ORIGIN, &TowerConfig::default())
        }
    }

    #[test]
    fn pairs_are_symmetric() {
        assert_eq!(
            pair_bonus(TowerClass::Laser, TowerClass::Sniper),
            pair_bonus(TowerClass::Sniper, TowerClass::Laser)
        );
        assert_eq!(
            pair_bonus(TowerClass::Sniper, TowerClass::Gatling),
            SynergyBonuses::default()
        );
    }

    #[test]
    fn synergy_is_capped_per_kind() {
        let capped = cap_synergy(bonus(0.9, 0.05, 0.45));
        assert_eq!(capped, bonus(0.30, 0.05, 0.30));
    }

    #[test]
    fn chokepoint_raises_damage_and_high_ground_raises_range() {
        let tower = tower(None);
        let open = FiringStats::for_tower(&tower, SlotTerrain::Open, &NEUTRAL_BULLET_TYPE);
        let choke = FiringStats::for_tower(&tower, SlotTerrain::Chokepoint, &NEUTRAL_BULLET_TYPE);
        let high = FiringStats::for_tower(&tower, SlotTerrain::HighGround, &NEUTRAL_BULLET_TYPE);

        assert!((open.damage - 20.0).abs() < 1e-4);
        assert!((choke.damage - 23.0).abs() < 1e-4);
        assert!((high.range_multiplier - 1.2).abs() < 1e-5);
        assert_eq!(open.interval, Duration::from_secs(1));
    }

    #[test]
    fn class_and_bullet_level_scale_damage() {
        let mut sniper = tower(Some(TowerClass::Sniper));
        sniper.bullet_level = 3;

        let stats = FiringStats::for_tower(&sniper, SlotTerrain::Open, &NEUTRAL_BULLET_TYPE);

        // 20 × 2.5 × 1.2
        assert!((stats.damage - 60.0).abs() < 1e-3);
        assert_eq!(stats.interval, Duration::from_secs(2));
        assert!((stats.range_multiplier - 1.8).abs() < 1e-5);
    }

    #[test]
    fn fire_rate_synergy_shortens_interval() {
        let mut gatling = tower(Some(TowerClass::Gatling));
        gatling.synergy = bonus(0.0, 0.0, 0.25);

        let stats = FiringStats::for_tower(&gatling, SlotTerrain::Open, &NEUTRAL_BULLET_TYPE);

        // 1000 ms × 0.35 / 1.25
        assert!((stats.interval.as_secs_f64() - 0.28).abs() < 1e-6);
        assert_eq!(stats.projectiles, 2);
    }

    #[test]
    fn mortar_carries_splash() {
        let stats = FiringStats::for_tower(
            &tower(Some(TowerClass::Mortar)),
            SlotTerrain::Open,
            &NEUTRAL_BULLET_TYPE,
        );
        assert!((stats.splash_radius - 60.0).abs() < 1e-5);
    }

    #[test]
    fn readiness_respects_interval() {
        let stats = FiringStats {
            interval: Duration::from_millis(500),
            damage: 1.0,
            range_multiplier: 1.0,
            projectiles: 1,
            splash_radius: 0.0,
        };
        assert!(stats.is_ready(None, Duration::ZERO));
        assert!(!stats.is_ready(Some(Duration::ZERO), Duration::from_millis(499)));
        assert!(stats.is_ready(Some(Duration::ZERO), Duration::from_millis(500)));
    }
}
