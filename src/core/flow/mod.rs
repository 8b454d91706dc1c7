//! Flow meter integration
//!
//! Glue between a pulse-output flow sensor and the monotonic counter: an
//! interrupt-safe pulse total and the sampler that persists whole counter
//! steps, run periodically with the `embassy` feature.

pub mod pulse;
pub mod task;

pub use pulse::PulseSource;
pub use task::CounterSampler;
