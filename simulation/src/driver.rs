//! Fixed-step driver that turns variable frame times into simulation ticks.

use std::time::Duration;

use ring_defence_core::LoopConfig;
use tracing::debug;

use crate::Simulation;

/// Accumulates frame time and runs the simulation in fixed steps.
///
/// At most `max_steps_per_frame` steps run per frame. Whole steps beyond that
/// cap are dropped so a slow frame cannot snowball; the sub-step remainder is
/// always carried into the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedStepDriver {
    step: Duration,
    max_steps_per_frame: u32,
    carry: Duration,
}

impl FixedStepDriver {
    /// Creates a driver with an explicit cadence. A zero step or cap is
    /// raised to the smallest usable value.
    #[must_use]
    pub fn new(step: Duration, max_steps_per_frame: u32) -> Self {
        Self {
            step: step.max(Duration::from_millis(1)),
            max_steps_per_frame: max_steps_per_frame.max(1),
            carry: Duration::ZERO,
        }
    }

    /// Creates a driver from the loop section of the configuration.
    #[must_use]
    pub fn from_config(config: &LoopConfig) -> Self {
        Self::new(config.step(), config.max_steps_per_frame)
    }

    /// Simulated time per step.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Time waiting to be simulated.
    #[must_use]
    pub const fn carry(&self) -> Duration {
        self.carry
    }

    /// Adds `frame` to the carried time and returns how many steps are due.
    pub fn accumulate(&mut self, frame: Duration) -> u32 {
        self.carry = self.carry.saturating_add(frame);
        let mut steps = 0;
        while self.carry >= self.step && steps < self.max_steps_per_frame {
            self.carry -= self.step;
            steps += 1;
        }
        if self.carry >= self.step {
            let step_nanos = self.step.as_nanos();
            let dropped = self.carry.as_nanos() / step_nanos;
            debug!(dropped, "fixed step backlog dropped");
            self.carry = Duration::from_nanos((self.carry.as_nanos() % step_nanos) as u64);
        }
        steps
    }

    /// Runs every step due after `frame` and returns the number of ticks.
    pub fn advance(&mut self, simulation: &mut Simulation, frame: Duration) -> u32 {
        let steps = self.accumulate(frame);
        for _ in 0..steps {
            let _ = simulation.tick(self.step);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leftover_time_is_carried() {
        let mut driver = FixedStepDriver::new(Duration::from_millis(16), 5);

        assert_eq!(driver.accumulate(Duration::from_millis(10)), 0);
        assert_eq!(driver.accumulate(Duration::from_millis(10)), 1);
        assert_eq!(driver.carry(), Duration::from_millis(4));
        assert_eq!(driver.accumulate(Duration::from_millis(28)), 2);
        assert_eq!(driver.carry(), Duration::ZERO);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut driver = FixedStepDriver::new(Duration::from_millis(10), 3);

        assert_eq!(driver.accumulate(Duration::from_millis(1_005)), 3);
        assert_eq!(driver.carry(), Duration::from_millis(5));
        assert_eq!(driver.accumulate(Duration::from_millis(5)), 1);
    }

    #[test]
    fn zero_step_is_rejected() {
        let driver = FixedStepDriver::new(Duration::ZERO, 0);
        assert_eq!(driver.step(), Duration::from_millis(1));
    }
}
