//! Monotonic counter building blocks
//!
//! Storage-independent pieces of the flash monotonic counter. The engine
//! that drives a region and a metadata store lives in the root crate.

pub mod bits;
pub mod config;
pub mod keys;
pub mod phase;

pub use bits::{clear_bit_range, count_cleared_bits, ByteSpan};
pub use config::{CounterConfig, MAX_CHUNK_BYTES};
pub use keys::{fnv1a32, CounterKeys, KeyError, MetaKey, KEY_CAPACITY, MAX_KEY_LEN};
pub use phase::RolloverPhase;
