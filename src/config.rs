//! Build-time configuration
//!
//! Values come from environment variables captured by `build.rs`:
//!
//! - `FLOW_COUNTER_LABEL` - Partition label of the counter region
//! - `FLOW_PULSES_PER_LITER` - Sensor pulses per liter
//! - `FLOW_LITERS_PER_STEP` - Liters per counter step
//! - `FLOW_SAMPLE_PERIOD_MS` - Sampling period of the counter task
//! - `FLOW_COUNTER_VERIFY_WRITES` - Read back counter writes (true/false)
//!
//! Values that do not parse, or parse to zero, fall back to the defaults.

use flow_counter_core::counter::CounterConfig;
use flow_counter_core::flow::FlowMeterConfig;

/// Partition label of the counter region
pub const COUNTER_LABEL: &str = env!("FLOW_COUNTER_LABEL");

/// Counter configuration for this build
pub fn counter_config() -> CounterConfig {
    CounterConfig {
        verify_writes: parse_bool(env!("FLOW_COUNTER_VERIFY_WRITES"), false),
        ..CounterConfig::default()
    }
}

/// Flow meter configuration for this build
pub fn flow_meter_config() -> FlowMeterConfig {
    let defaults = FlowMeterConfig::default();
    FlowMeterConfig {
        pulses_per_liter: parse_nonzero(env!("FLOW_PULSES_PER_LITER"))
            .unwrap_or(defaults.pulses_per_liter),
        liters_per_step: parse_nonzero(env!("FLOW_LITERS_PER_STEP"))
            .unwrap_or(defaults.liters_per_step),
        sample_period_ms: parse_nonzero::<u64>(env!("FLOW_SAMPLE_PERIOD_MS"))
            .unwrap_or(defaults.sample_period_ms),
    }
}

fn parse_nonzero<T>(value: &str) -> Option<T>
where
    T: core::str::FromStr + PartialEq + Default,
{
    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(|v| *v != T::default())
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" => true,
        "0" | "false" | "FALSE" | "no" => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nonzero() {
        assert_eq!(parse_nonzero::<u32>("270"), Some(270));
        assert_eq!(parse_nonzero::<u32>(" 12 "), Some(12));
        assert_eq!(parse_nonzero::<u32>("0"), None);
        assert_eq!(parse_nonzero::<u32>("abc"), None);
        assert_eq!(parse_nonzero::<u64>(""), None);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true", false));
        assert!(parse_bool("1", false));
        assert!(!parse_bool("false", true));
        assert!(parse_bool("maybe", true));
        assert!(!parse_bool("", false));
    }

    #[test]
    fn test_build_configs_are_valid() {
        assert!(!COUNTER_LABEL.is_empty());
        assert!(counter_config().is_valid());
        assert!(flow_meter_config().is_valid());
    }
}
