#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that ranks in-range enemies for a tower.
//!
//! Every strategy is expressed as a score where larger is better. Candidates
//! are visited in slice order and only a strictly better score replaces the
//! current best, so ties resolve to the earliest enemy.

use ring_defence_core::{Enemy, Position, TargetingStrategy, Tower};

/// Parameters of a single targeting request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetQuery {
    /// Position the range is measured from.
    pub origin: Position,
    /// Effective range after every multiplier.
    pub range: f32,
    /// Ranking applied to in-range enemies.
    pub strategy: TargetingStrategy,
}

impl TargetQuery {
    /// Builds the query for `tower`, scaling its base range by `range_multiplier`.
    #[must_use]
    pub fn for_tower(tower: &Tower, range_multiplier: f32) -> Self {
        Self {
            origin: tower.position,
            range: tower.range * range_multiplier,
            strategy: tower.strategy(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    index: usize,
    score: f32,
}

/// Tower targeting system that reuses scratch buffers between towers.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the best in-range enemy, returning its index into `enemies`.
    #[must_use]
    pub fn select(&self, query: &TargetQuery, enemies: &[Enemy]) -> Option<usize> {
        let mut best: Option<Candidate> = None;
        for (index, enemy) in enemies.iter().enumerate() {
            let Some(score) = score_in_range(query, enemy) else {
                continue;
            };
            match best {
                Some(existing) if score <= existing.score => {}
                _ => best = Some(Candidate { index, score }),
            }
        }
        best.map(|candidate| candidate.index)
    }

    /// Writes up to `count` in-range enemy indices into `out`, best first.
    ///
    /// The output buffer is cleared before populating it.
    pub fn select_many(
        &mut self,
        query: &TargetQuery,
        enemies: &[Enemy],
        count: usize,
        out: &mut Vec<usize>,
    ) {
        out.clear();
        if count == 0 {
            return;
        }

        self.candidates.clear();
        for (index, enemy) in enemies.iter().enumerate() {
            if let Some(score) = score_in_range(query, enemy) {
                self.candidates.push(Candidate { index, score });
            }
        }
        // stable: equal scores keep slice order
        self.candidates
            .sort_by(|left, right| right.score.total_cmp(&left.score));
        out.extend(
            self.candidates
                .iter()
                .take(count)
                .map(|candidate| candidate.index),
        );
    }
}

fn score_in_range(query: &TargetQuery, enemy: &Enemy) -> Option<f32> {
    if !enemy.is_alive() {
        return None;
    }
    let distance = query.origin.distance(enemy.position);
    if !(distance <= query.range) {
        return None;
    }
    let score = strategy_score(query.strategy, enemy, distance);
    score.is_finite().then_some(score)
}

/// Score of `enemy` under `strategy`; larger values are preferred.
#[must_use]
pub fn strategy_score(strategy: TargetingStrategy, enemy: &Enemy, distance: f32) -> f32 {
    match strategy {
        TargetingStrategy::Nearest => -distance,
        TargetingStrategy::Furthest => distance,
        TargetingStrategy::HighestHp => enemy.health.current(),
        TargetingStrategy::LowestHp => -enemy.health.current(),
        TargetingStrategy::Fastest => enemy.speed,
        TargetingStrategy::HighestValue => enemy.gold_value as f32,
        TargetingStrategy::ThreatAssessment => threat_score(enemy, distance),
        TargetingStrategy::ClosestToExit => -enemy.position.distance_from_origin(),
    }
}

/// Composite danger heuristic blending health, speed, value, boss and
/// microbe flags, and proximity to the tower.
#[must_use]
pub fn threat_score(enemy: &Enemy, distance: f32) -> f32 {
    let boss = if enemy.is_boss() { 50.0 } else { 0.0 };
    let special = if enemy.is_special { 20.0 } else { 0.0 };
    0.1 * enemy.health.current()
        + 5.0 * enemy.speed
        + 0.5 * enemy.gold_value as f32
        + boss
        + special
        + 0.1 * (100.0 - distance).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_defence_core::{EnemyId, EnemyKind, Health};

    fn enemy(id: u32, x: f32, health: f32) -> Enemy {
        Enemy {
            health: Health::new(health),
            ..Enemy::new(EnemyId::new(id), EnemyKind::Basic, Position::new(x, 0.0))
        }
    }

    fn query(strategy: TargetingStrategy) -> TargetQuery {
        TargetQuery {
            origin: Position::ORIGIN,
            range: 150.0,
            strategy,
        }
    }

    #[test]
    fn health_strategies_pick_extremes() {
        let system = TowerTargeting::new();
        let mut enemies = vec![enemy(0, 50.0, 30.0), enemy(1, 60.0, 80.0), enemy(2, 70.0, 50.0)];

        assert_eq!(system.select(&query(TargetingStrategy::HighestHp), &enemies), Some(1));
        assert_eq!(system.select(&query(TargetingStrategy::LowestHp), &enemies), Some(0));

        enemies[1].position = Position::new(400.0, 0.0);
        assert_eq!(system.select(&query(TargetingStrategy::HighestHp), &enemies), Some(2));
    }

    #[test]
    fn ties_resolve_to_the_first_enemy() {
        let system = TowerTargeting::new();
        let enemies = vec![enemy(0, 50.0, 40.0), enemy(1, -50.0, 40.0)];

        assert_eq!(system.select(&query(TargetingStrategy::Nearest), &enemies), Some(0));
        assert_eq!(system.select(&query(TargetingStrategy::HighestHp), &enemies), Some(0));
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let system = TowerTargeting::new();
        let enemies = vec![enemy(0, 150.0, 10.0), enemy(1, 150.5, 10.0)];

        assert_eq!(system.select(&query(TargetingStrategy::Furthest), &enemies), Some(0));
    }

    #[test]
    fn no_candidates_yield_no_target() {
        let mut system = TowerTargeting::new();
        let mut out = vec![7];

        assert_eq!(system.select(&query(TargetingStrategy::Nearest), &[]), None);
        system.select_many(&query(TargetingStrategy::Nearest), &[], 3, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn dead_enemies_are_not_targeted() {
        let system = TowerTargeting::new();
        let mut enemies = vec![enemy(0, 20.0, 10.0), enemy(1, 90.0, 10.0)];
        let _ = enemies[0].health.apply(10.0);

        assert_eq!(system.select(&query(TargetingStrategy::Nearest), &enemies), Some(1));
    }

    #[test]
    fn select_many_orders_best_first_and_truncates() {
        let mut system = TowerTargeting::new();
        let enemies = vec![
            enemy(0, 10.0, 30.0),
            enemy(1, 20.0, 80.0),
            enemy(2, 30.0, 50.0),
            enemy(3, 40.0, 80.0),
        ];
        let mut out = Vec::new();

        system.select_many(&query(TargetingStrategy::HighestHp), &enemies, 3, &mut out);

        assert_eq!(out, vec![1, 3, 2]);
    }

    #[test]
    fn closest_to_exit_prefers_enemies_near_the_centre() {
        let system = TowerTargeting::new();
        let query = TargetQuery {
            origin: Position::new(100.0, 0.0),
            range: 150.0,
            strategy: TargetingStrategy::ClosestToExit,
        };
        let enemies = vec![enemy(0, 200.0, 10.0), enemy(1, 40.0, 10.0)];

        assert_eq!(system.select(&query, &enemies), Some(1));
    }

    #[test]
    fn threat_score_weights_bosses_and_proximity() {
        let mut plain = enemy(0, 0.0, 100.0);
        plain.speed = 10.0;
        plain.gold_value = 10;
        // 10 + 50 + 5 + 0.1 * 60
        assert!((threat_score(&plain, 40.0) - 71.0).abs() < 1e-4);

        plain.boss = Some(ring_defence_core::BossKind::Warlord);
        plain.is_special = true;
        assert!((threat_score(&plain, 200.0) - 135.0).abs() < 1e-4);
    }

    #[test]
    fn tower_query_uses_class_strategy_and_multiplier() {
        let tower = Tower {
            class: Some(ring_defence_core::TowerClass::Sniper),
            ..Tower::new(
                ring_defence_core::TowerId::new(0),
                Position::new(10.0, 0.0),
                &ring_defence_core::TowerConfig::default(),
            )
        };

        let query = TargetQuery::for_tower(&tower, 2.0);

        assert_eq!(query.strategy, TargetingStrategy::HighestHp);
        assert!((query.range - 300.0).abs() < 1e-4);
    }
}
