//! Tower pricing and level progression.

use ring_defence_core::{Tower, TowerClass, TowerConfig, TowerType, UpgradeKind};

/// Gold required to build a tower of the given type and class.
pub(crate) fn build_cost(config: &TowerConfig, tower_type: TowerType, class: Option<TowerClass>) -> u32 {
    match tower_type {
        TowerType::Economy => config.economy_cost,
        TowerType::Attack => {
            config.base_cost + class.map_or(0, |class| class.descriptor().cost)
        }
    }
}

/// Gold required to raise the given upgrade path by one level.
pub(crate) fn upgrade_cost(config: &TowerConfig, tower: &Tower, upgrade: UpgradeKind) -> u32 {
    let level = match upgrade {
        UpgradeKind::Tower => tower.level,
        UpgradeKind::Bullet => tower.bullet_level,
    };
    config.upgrade_cost.saturating_mul(level)
}

/// Total gold spent on the tower so far.
pub(crate) fn invested_gold(config: &TowerConfig, tower: &Tower) -> u32 {
    let steps = triangular(tower.level) + triangular(tower.bullet_level);
    build_cost(config, tower.tower_type, tower.class)
        .saturating_add(config.upgrade_cost.saturating_mul(steps))
}

/// Gold returned when the tower is dismantled.
pub(crate) fn refund(config: &TowerConfig, tower: &Tower) -> u32 {
    (invested_gold(config, tower) as f32 * config.dismantle_refund).floor() as u32
}

/// Raises the tower level and rescales its base statistics.
pub(crate) fn raise_level(config: &TowerConfig, tower: &mut Tower) {
    tower.level += 1;
    let steps = (tower.level - 1) as f32;
    tower.damage = config.damage * (1.0 + config.damage_per_level * steps);
    tower.range = config.range * (1.0 + config.range_per_level * steps);

    let previous = 1.0 + config.health_per_level * (steps - 1.0);
    let next = 1.0 + config.health_per_level * steps;
    tower.health.scale_max(next / previous);
}

/// Sum of upgrade levels already purchased below `level`.
fn triangular(level: u32) -> u32 {
    let below = level.saturating_sub(1);
    below * (below + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_defence_core::{Position, TowerId};

    fn tower() -> Tower {
        Tower::new(TowerId::new(0), Position::ORIGIN, &TowerConfig::default())
    }

    #[test]
    fn class_cost_is_added_to_base_cost() {
        let config = TowerConfig::default();
        assert_eq!(build_cost(&config, TowerType::Attack, None), 50);
        assert_eq!(
            build_cost(&config, TowerType::Attack, Some(TowerClass::Sniper)),
            50 + TowerClass::Sniper.descriptor().cost
        );
        assert_eq!(build_cost(&config, TowerType::Economy, None), 75);
    }

    #[test]
    fn invested_gold_accumulates_upgrades() {
        let config = TowerConfig::default();
        let mut tower = tower();
        raise_level(&config, &mut tower);
        raise_level(&config, &mut tower);
        tower.bullet_level = 2;

        // 50 build + 40·1 + 40·2 tower upgrades + 40·1 bullet upgrade
        assert_eq!(invested_gold(&config, &tower), 210);
        assert_eq!(refund(&config, &tower), 105);
    }

    #[test]
    fn raising_level_scales_statistics() {
        let config = TowerConfig::default();
        let mut tower = tower();
        raise_level(&config, &mut tower);

        assert_eq!(tower.level, 2);
        assert!((tower.damage - 25.0).abs() < 1e-4);
        assert!((tower.range - 157.5).abs() < 1e-3);
        assert!((tower.health.max() - 240.0).abs() < 1e-3);
        assert_eq!(tower.health.current(), tower.health.max());
    }
}
