//! Scripted build order used by the headless runner.

use std::collections::VecDeque;

use ring_defence_core::{Command, Event, Position, RejectReason, SlotIndex, TowerClass, TowerType};
use ring_defence_simulation::Simulation;
use tracing::{debug, warn};

/// Purchases queued by the demo defence, bought in order whenever gold allows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Purchase {
    Tower {
        slot: u32,
        tower_type: TowerType,
        class: Option<TowerClass>,
        bullet_type: usize,
    },
    Mine {
        position: Position,
    },
    Unlock {
        slot: u32,
    },
}

impl Purchase {
    fn command(self) -> Command {
        match self {
            Purchase::Tower {
                slot,
                tower_type,
                class,
                bullet_type,
            } => Command::BuildTower {
                slot: SlotIndex::new(slot),
                tower_type,
                class,
                bullet_type,
            },
            Purchase::Mine { position } => Command::PlaceMine { position },
            Purchase::Unlock { slot } => Command::UnlockSlot {
                slot: SlotIndex::new(slot),
            },
        }
    }
}

const fn attacker(slot: u32, class: Option<TowerClass>, bullet_type: usize) -> Purchase {
    Purchase::Tower {
        slot,
        tower_type: TowerType::Attack,
        class,
        bullet_type,
    }
}

const BUILD_ORDER: [Purchase; 13] = [
    attacker(0, Some(TowerClass::Gatling), 0),
    attacker(3, Some(TowerClass::Mortar), 0),
    Purchase::Mine {
        position: Position::new(0.0, 320.0),
    },
    Purchase::Tower {
        slot: 1,
        tower_type: TowerType::Economy,
        class: None,
        bullet_type: 0,
    },
    attacker(2, Some(TowerClass::Tesla), 0),
    attacker(4, Some(TowerClass::Sniper), 0),
    attacker(5, Some(TowerClass::ShieldGenerator), 0),
    attacker(6, None, 1),
    attacker(10, Some(TowerClass::Flamethrower), 0),
    Purchase::Mine {
        position: Position::new(-320.0, 0.0),
    },
    attacker(8, Some(TowerClass::Laser), 0),
    Purchase::Unlock { slot: 15 },
    attacker(15, Some(TowerClass::RepairStation), 0),
];

/// Outcome of a shopping pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Spending {
    pub(crate) bought: u32,
    pub(crate) skipped: u32,
}

/// Build order that is worked through as the treasury fills up.
#[derive(Debug)]
pub(crate) struct DemoDefence {
    queue: VecDeque<Purchase>,
}

impl DemoDefence {
    pub(crate) fn new() -> Self {
        Self {
            queue: BUILD_ORDER.into_iter().collect(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Buys queued items until one is unaffordable. Items rejected for any
    /// other reason are dropped from the queue.
    pub(crate) fn spend(&mut self, simulation: &mut Simulation) -> Spending {
        let mut spending = Spending::default();
        while let Some(purchase) = self.queue.front().copied() {
            let events = simulation.apply(purchase.command());
            match rejection(&events) {
                None => {
                    debug!(?purchase, "purchase completed");
                    spending.bought += 1;
                }
                Some(RejectReason::InsufficientGold) => break,
                Some(reason) => {
                    warn!(?purchase, ?reason, "purchase dropped");
                    spending.skipped += 1;
                }
            }
            let _ = self.queue.pop_front();
        }
        spending
    }
}

fn rejection(events: &[Event]) -> Option<RejectReason> {
    events.iter().find_map(|event| match event {
        Event::CommandRejected { reason, .. } => Some(*reason),
        _ => None,
    })
}
