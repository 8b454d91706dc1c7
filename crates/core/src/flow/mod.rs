//! Flow meter pulse handling
//!
//! Converts raw pulses from a flow sensor into monotonic counter steps.

pub mod accumulator;
pub mod config;

pub use accumulator::PulseAccumulator;
pub use config::FlowMeterConfig;
