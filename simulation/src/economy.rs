//! Passive income paid by economy towers.

use std::time::Duration;

use ring_defence_core::{Event, GoldSource, TowerType};
use ring_defence_world::World;

/// Pays `income_amount` gold per elapsed `income_interval` of every economy tower.
#[derive(Debug, Default)]
pub(crate) struct Income {
    payouts: u32,
}

impl Income {
    pub(crate) fn handle(&mut self, world: &mut World, dt: Duration, out: &mut Vec<Event>) {
        let economy = world.config().economy;
        let interval = economy.income_interval();
        if interval.is_zero() || economy.income_amount == 0 {
            return;
        }

        self.payouts = 0;
        for slot in world.slots_mut() {
            let Some(tower) = slot.tower.as_mut() else {
                continue;
            };
            if tower.tower_type != TowerType::Economy {
                continue;
            }
            tower.income_timer = tower.income_timer.saturating_add(dt);
            while tower.income_timer >= interval {
                tower.income_timer -= interval;
                self.payouts += 1;
            }
        }

        for _ in 0..self.payouts {
            world.earn_gold(economy.income_amount, GoldSource::Income, out);
        }
    }
}
