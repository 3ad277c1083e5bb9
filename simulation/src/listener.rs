//! Event consumers attached to the game loop.

use std::collections::BTreeMap;

use ring_defence_core::{Event, RewardKind};
use thiserror::Error;

/// Failure reported by a [`SimulationListener`].
///
/// The loop logs listener failures and keeps going; they never abort a tick.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listener could not process an event.
    #[error("listener `{listener}` failed: {reason}")]
    Failed {
        /// Name of the failing listener.
        listener: &'static str,
        /// Human readable explanation.
        reason: String,
    },
    /// The listener stopped accepting events.
    #[error("listener `{0}` is closed")]
    Closed(&'static str),
}

/// Consumer of the committed event stream.
pub trait SimulationListener {
    /// Name used when reporting failures.
    fn name(&self) -> &'static str {
        "listener"
    }

    /// Receives one committed event.
    fn on_event(&mut self, event: &Event) -> Result<(), ListenerError>;
}

/// Counts reward events by their taxonomy name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardLedger {
    counts: BTreeMap<RewardKind, u32>,
    gold_earned: u64,
    gold_spent: u64,
    perfect_waves: u32,
}

impl RewardLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events recorded under `kind`.
    #[must_use]
    pub fn count(&self, kind: RewardKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Recorded counts keyed by canonical event name.
    pub fn counts(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.counts.iter().map(|(kind, count)| (kind.as_str(), *count))
    }

    /// Gold paid out by kills and income.
    #[must_use]
    pub const fn gold_earned(&self) -> u64 {
        self.gold_earned
    }

    /// Gold spent on towers and upgrades.
    #[must_use]
    pub const fn gold_spent(&self) -> u64 {
        self.gold_spent
    }

    /// Waves completed without a single leak.
    #[must_use]
    pub const fn perfect_waves(&self) -> u32 {
        self.perfect_waves
    }
}

impl SimulationListener for RewardLedger {
    fn name(&self) -> &'static str {
        "reward_ledger"
    }

    fn on_event(&mut self, event: &Event) -> Result<(), ListenerError> {
        let Some((kind, payload)) = event.reward() else {
            return Ok(());
        };
        *self.counts.entry(kind).or_insert(0) += 1;

        let amount = u64::from(payload.amount.unwrap_or(0));
        match kind {
            RewardKind::GoldEarned => self.gold_earned += amount,
            RewardKind::TowerBuilt | RewardKind::UpgradePurchased => self.gold_spent += amount,
            RewardKind::WaveCompleted | RewardKind::EnemyKilled => {}
        }
        if payload.perfect_wave == Some(true) {
            self.perfect_waves += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_defence_core::{GoldSource, SlotIndex, TowerId};

    #[test]
    fn ledger_counts_only_reward_events() {
        let mut ledger = RewardLedger::new();
        let events = [
            Event::WaveCompleted {
                wave: 1,
                perfect: true,
            },
            Event::WaveCompleted {
                wave: 2,
                perfect: false,
            },
            Event::GoldEarned {
                amount: 15,
                source: GoldSource::Income,
            },
            Event::TowerBuilt {
                tower: TowerId::new(0),
                slot: SlotIndex::new(0),
                class: None,
                cost: 50,
            },
            Event::BaseDestroyed,
        ];

        for event in &events {
            ledger.on_event(event).expect("ledger never fails");
        }

        assert_eq!(ledger.count(RewardKind::WaveCompleted), 2);
        assert_eq!(ledger.count(RewardKind::EnemyKilled), 0);
        assert_eq!(ledger.perfect_waves(), 1);
        assert_eq!(ledger.gold_earned(), 15);
        assert_eq!(ledger.gold_spent(), 50);
        let names: Vec<&str> = ledger.counts().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["wave_completed", "tower_built", "gold_earned"]);
    }

    #[test]
    fn listener_errors_name_the_listener() {
        let error = ListenerError::Failed {
            listener: "telemetry",
            reason: "socket closed".to_owned(),
        };
        assert_eq!(error.to_string(), "listener `telemetry` failed: socket closed");
        assert_eq!(
            ListenerError::Closed("audio").to_string(),
            "listener `audio` is closed"
        );
    }
}
