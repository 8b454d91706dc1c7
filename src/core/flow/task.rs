//! Periodic flow counter sampling
//!
//! Once per sample period the pulse total is read, converted to whole
//! counter steps and written with a single `increment` call. Steps are only
//! acknowledged once the counter has accepted them, so a failed write is
//! retried on the next period.

use crate::core::counter::{MonotonicCounter, Result};
use crate::platform::{MetadataStore, RegionInterface};
use flow_counter_core::flow::{FlowMeterConfig, PulseAccumulator};

/// Converts pulse samples into counter increments
#[derive(Debug, Clone, Copy)]
pub struct CounterSampler {
    accumulator: PulseAccumulator,
    config: FlowMeterConfig,
}

impl CounterSampler {
    /// Resume sampling from the counter's persisted value
    pub fn resume<R: RegionInterface, M: MetadataStore>(
        counter: &MonotonicCounter<R, M>,
        config: FlowMeterConfig,
        raw_pulses: u32,
    ) -> Self {
        let steps = counter.value();
        crate::log_info!(
            "Flow counter resumed: steps={} volume={} l",
            steps,
            steps * config.liters_per_step as u64
        );

        Self {
            accumulator: PulseAccumulator::resume(&config, steps, raw_pulses),
            config,
        }
    }

    /// Process one pulse total sample
    ///
    /// Returns the number of steps the counter accepted.
    pub fn sample<R: RegionInterface, M: MetadataStore>(
        &mut self,
        counter: &mut MonotonicCounter<R, M>,
        raw_pulses: u32,
    ) -> Result<u32> {
        let new_pulses = self.accumulator.sample(raw_pulses);
        let due = self.accumulator.due_steps();
        crate::log_trace!(
            "Flow sample: new={} total={} due={}",
            new_pulses,
            self.accumulator.total_pulses(),
            due
        );
        if due == 0 {
            return Ok(0);
        }

        let before = counter.value();
        let result = counter.increment(due);
        let accepted = counter.value().saturating_sub(before).min(due as u64) as u32;
        self.accumulator.commit(accepted);

        result.map(|()| accepted)
    }

    /// Liters represented by the persisted steps
    pub fn committed_liters(&self) -> u64 {
        self.accumulator.committed_liters(&self.config)
    }

    /// Underlying accumulator (for diagnostics)
    pub fn accumulator(&self) -> &PulseAccumulator {
        &self.accumulator
    }
}

/// Run the sampling loop forever
///
/// Locks the shared counter once per period. Wrap this in an
/// `#[embassy_executor::task]` with the concrete region and store types.
#[cfg(feature = "embassy")]
pub async fn run_counter_task<R, M>(
    counter: &embassy_sync::mutex::Mutex<
        embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex,
        MonotonicCounter<R, M>,
    >,
    source: &super::pulse::PulseSource,
    config: FlowMeterConfig,
) -> !
where
    R: RegionInterface,
    M: MetadataStore,
{
    use embassy_time::{Duration, Ticker};

    let mut sampler = {
        let guard = counter.lock().await;
        CounterSampler::resume(&guard, config, source.total())
    };
    let mut ticker = Ticker::every(Duration::from_millis(config.sample_period_ms));

    loop {
        ticker.next().await;

        let mut guard = counter.lock().await;
        if let Err(e) = sampler.sample(&mut guard, source.total()) {
            crate::log_error!("Flow counter write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{FlashOp, MockMetadataStore, MockPartitionTable, MockRegion};

    fn config() -> FlowMeterConfig {
        FlowMeterConfig {
            pulses_per_liter: 10,
            liters_per_step: 1,
            sample_period_ms: 200,
        }
    }

    fn counter() -> (MonotonicCounter<MockRegion, MockMetadataStore>, MockRegion) {
        let mut table = MockPartitionTable::new();
        let region = table.add("flow_data0", 32);
        let mut counter = MonotonicCounter::new(MockMetadataStore::new("flash_ctr"));
        counter.init(&mut table, "flow_data0").unwrap();
        (counter, region)
    }

    #[test]
    fn test_sample_increments_whole_steps() {
        let (mut counter, _) = counter();
        let mut sampler = CounterSampler::resume(&counter, config(), 0);

        assert_eq!(sampler.sample(&mut counter, 9).unwrap(), 0);
        assert_eq!(sampler.sample(&mut counter, 35).unwrap(), 3);
        assert_eq!(counter.value(), 3);
        assert_eq!(sampler.committed_liters(), 3);
    }

    #[test]
    fn test_failed_increment_retried_next_period() {
        let (mut counter, region) = counter();
        let mut sampler = CounterSampler::resume(&counter, config(), 0);

        region.fail_next(FlashOp::Write);
        assert!(sampler.sample(&mut counter, 20).is_err());
        assert_eq!(sampler.accumulator().committed_steps(), 0);

        assert_eq!(sampler.sample(&mut counter, 20).unwrap(), 2);
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_resume_continues_from_counter_value() {
        let (mut counter, _) = counter();
        counter.increment(4).unwrap();

        let mut sampler = CounterSampler::resume(&counter, config(), 1000);
        assert_eq!(sampler.accumulator().total_pulses(), 40);
        assert_eq!(sampler.sample(&mut counter, 1015).unwrap(), 1);
        assert_eq!(counter.value(), 5);
    }
}
