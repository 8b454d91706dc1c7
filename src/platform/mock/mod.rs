//! Mock platform implementation for testing
//!
//! This module provides in-memory storage backends that can be used for unit
//! testing without flash hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use flow_counter::platform::mock::{MockMetadataStore, MockPartitionTable};
//! use flow_counter::MonotonicCounter;
//!
//! let mut table = MockPartitionTable::new();
//! table.add("flow_data0", 32);
//!
//! let mut counter = MonotonicCounter::new(MockMetadataStore::new("flash_ctr"));
//! counter.init(&mut table, "flow_data0").unwrap();
//! counter.increment(3).unwrap();
//! assert_eq!(counter.value(), 3);
//! ```

#![cfg(any(test, feature = "mock"))]

mod flash;
mod metadata;

pub use flash::{FlashOp, MockPartitionTable, MockRegion};
pub use metadata::{MetaValue, MockMetadataStore, MAX_META_ENTRIES};
