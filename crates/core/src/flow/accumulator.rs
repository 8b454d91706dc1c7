//! Pulse to counter-step accumulation
//!
//! The sampling task sees a free-running pulse total. Only whole steps are
//! persisted; the fractional remainder stays in RAM and is lost on reset,
//! which under-counts by less than one step and never over-counts.

use super::config::FlowMeterConfig;

/// Tracks how many counter steps are due for the pulses seen so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseAccumulator {
    /// Pulses per counter step
    pulses_per_step: u64,
    /// Pulse total at the last sample
    last_raw: u32,
    /// Pulses accounted for, including those restored at start-up
    total_pulses: u64,
    /// Steps the counter has durably accepted
    committed_steps: u64,
}

impl PulseAccumulator {
    /// Create an accumulator resuming from a persisted counter value
    ///
    /// `raw_pulses` is the current free-running pulse total so that pulses
    /// counted before start-up are not attributed to the first sample.
    pub fn resume(config: &FlowMeterConfig, committed_steps: u64, raw_pulses: u32) -> Self {
        let pulses_per_step = config.pulses_per_step().max(1);
        Self {
            pulses_per_step,
            last_raw: raw_pulses,
            total_pulses: committed_steps.saturating_mul(pulses_per_step),
            committed_steps,
        }
    }

    /// Record a new pulse total sample
    ///
    /// Handles wrap-around of the 32-bit raw counter. Returns the number of
    /// new pulses since the previous sample.
    pub fn sample(&mut self, raw_pulses: u32) -> u32 {
        let new_pulses = raw_pulses.wrapping_sub(self.last_raw);
        self.last_raw = raw_pulses;
        self.total_pulses += new_pulses as u64;
        new_pulses
    }

    /// Steps due to be written to the counter
    ///
    /// Saturates at `u32::MAX`; the remainder is reported by the next call.
    pub fn due_steps(&self) -> u32 {
        let target = self.total_pulses / self.pulses_per_step;
        let due = target.saturating_sub(self.committed_steps);
        due.min(u32::MAX as u64) as u32
    }

    /// Acknowledge steps the counter has durably accepted
    pub fn commit(&mut self, steps: u32) {
        self.committed_steps += steps as u64;
    }

    /// Steps acknowledged so far
    pub fn committed_steps(&self) -> u64 {
        self.committed_steps
    }

    /// Total pulses accounted for
    pub fn total_pulses(&self) -> u64 {
        self.total_pulses
    }

    /// Volume in whole liters represented by the committed steps
    pub fn committed_liters(&self, config: &FlowMeterConfig) -> u64 {
        self.committed_steps * config.liters_per_step as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FlowMeterConfig {
        FlowMeterConfig {
            pulses_per_liter: 10,
            liters_per_step: 2,
            sample_period_ms: 200,
        }
    }

    #[test]
    fn test_resume_restores_pulse_total() {
        let acc = PulseAccumulator::resume(&config(), 7, 1234);
        assert_eq!(acc.total_pulses(), 140);
        assert_eq!(acc.due_steps(), 0);
        assert_eq!(acc.committed_liters(&config()), 14);
    }

    #[test]
    fn test_steps_become_due_on_whole_steps_only() {
        let mut acc = PulseAccumulator::resume(&config(), 0, 0);
        assert_eq!(acc.sample(19), 19);
        assert_eq!(acc.due_steps(), 0);

        acc.sample(45);
        assert_eq!(acc.due_steps(), 2);
    }

    #[test]
    fn test_uncommitted_steps_stay_due() {
        let mut acc = PulseAccumulator::resume(&config(), 0, 0);
        acc.sample(60);
        assert_eq!(acc.due_steps(), 3);

        // Counter write failed, nothing committed
        acc.sample(60);
        assert_eq!(acc.due_steps(), 3);

        acc.commit(3);
        assert_eq!(acc.due_steps(), 0);
        assert_eq!(acc.committed_steps(), 3);
    }

    #[test]
    fn test_raw_counter_wrap() {
        let mut acc = PulseAccumulator::resume(&config(), 0, u32::MAX - 4);
        assert_eq!(acc.sample(15), 20);
        assert_eq!(acc.due_steps(), 1);
    }
}
