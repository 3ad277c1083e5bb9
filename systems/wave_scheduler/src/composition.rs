//! Wave composition: explicit table lookups and the formula fallback.

use ring_defence_core::{
    config::{composition_size, rotation_boss, unlocked_kinds},
    EnemyKind, SpawningConfig, WaveCompositionTable, WaveEntry,
};

/// Immutable list of spawn entries for one wave.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveComposition {
    entries: Vec<WaveEntry>,
    required: u32,
}

impl WaveComposition {
    /// Wraps explicit entries; the wave requires every listed enemy.
    #[must_use]
    pub fn from_entries(entries: Vec<WaveEntry>) -> Self {
        let required = composition_size(&entries);
        Self { entries, required }
    }

    /// Composition of `wave`: the table entry when present, otherwise the
    /// formula mix of exactly `enemy_wave_increase × wave` enemies.
    #[must_use]
    pub fn resolve(table: &WaveCompositionTable, spawning: &SpawningConfig, wave: u32) -> Self {
        match table.get(wave) {
            Some(entries) => Self::from_entries(entries.to_vec()),
            None => Self::fallback(spawning, wave),
        }
    }

    /// Formula composition for `wave`.
    #[must_use]
    pub fn fallback(spawning: &SpawningConfig, wave: u32) -> Self {
        let total = spawning.enemy_wave_increase.saturating_mul(wave);
        let mut entries = Vec::new();

        let boss = rotation_boss(wave, spawning.boss_every).filter(|_| total > 0);
        let regular = total - u32::from(boss.is_some());

        let weights: Vec<(EnemyKind, u32)> = unlocked_kinds(wave)
            .filter(|kind| *kind != EnemyKind::Basic)
            .map(|kind| (kind, mix_weight(kind)))
            .collect();
        let weight_sum: u32 = mix_weight(EnemyKind::Basic) + weights.iter().map(|(_, w)| w).sum::<u32>();

        let mut assigned = 0;
        let mut extras = Vec::with_capacity(weights.len());
        for (kind, weight) in weights {
            let count = regular * weight / weight_sum;
            assigned += count;
            extras.push(WaveEntry::new(kind, count));
        }

        entries.push(WaveEntry::new(EnemyKind::Basic, regular - assigned));
        entries.extend(extras);
        entries.retain(|entry| entry.count > 0);

        if let Some(boss) = boss {
            entries.push(WaveEntry {
                boss: Some(boss),
                ..WaveEntry::new(EnemyKind::Tank, 1)
            });
        }

        Self {
            entries,
            required: total,
        }
    }

    /// Spawn entries in order.
    #[must_use]
    pub fn entries(&self) -> &[WaveEntry] {
        &self.entries
    }

    /// Number of kills or leaks that complete the wave.
    #[must_use]
    pub const fn required(&self) -> u32 {
        self.required
    }
}

fn mix_weight(kind: EnemyKind) -> u32 {
    match kind {
        EnemyKind::Basic => 4,
        EnemyKind::Scout => 2,
        EnemyKind::Tank => 1,
        EnemyKind::Ghost => 2,
        EnemyKind::Swarm => 3,
    }
}
