//! Flow meter configuration

/// Default sensor pulses per liter (F = 4.5 * Q, Q in l/min)
pub const DEFAULT_PULSES_PER_LITER: u32 = 270;

/// Default liters represented by one counter step
pub const DEFAULT_LITERS_PER_STEP: u32 = 10;

/// Default sampling period in milliseconds
pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 200;

/// Flow meter parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowMeterConfig {
    /// Sensor pulses per liter
    pub pulses_per_liter: u32,
    /// Liters per persisted counter step
    pub liters_per_step: u32,
    /// Sampling period of the counter task
    pub sample_period_ms: u64,
}

impl Default for FlowMeterConfig {
    fn default() -> Self {
        Self {
            pulses_per_liter: DEFAULT_PULSES_PER_LITER,
            liters_per_step: DEFAULT_LITERS_PER_STEP,
            sample_period_ms: DEFAULT_SAMPLE_PERIOD_MS,
        }
    }
}

impl FlowMeterConfig {
    /// Pulses that make up one counter step
    pub fn pulses_per_step(&self) -> u64 {
        self.pulses_per_liter as u64 * self.liters_per_step as u64
    }

    /// Validate flow meter parameters
    ///
    /// # Returns
    ///
    /// true if every parameter is non-zero
    pub fn is_valid(&self) -> bool {
        self.pulses_per_liter > 0 && self.liters_per_step > 0 && self.sample_period_ms > 0
    }
}
