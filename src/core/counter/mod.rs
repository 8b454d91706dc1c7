//! Flash monotonic counter
//!
//! A counter that only increases, survives power loss and spreads wear over
//! an erase-block region by clearing one bit per step.
//!
//! # Architecture
//!
//! - [`BitAllocator`]: used-bit tracking, chunked clear writes, recovery scan
//! - [`RolloverCoordinator`]: two-phase erase of a full region
//! - [`MonotonicCounter`]: `init` / `increment` / `reset` / `value`

pub mod allocator;
pub mod error;
pub mod monotonic;
pub mod rollover;

pub use allocator::BitAllocator;
pub use error::{CounterError, Result};
pub use monotonic::MonotonicCounter;
pub use rollover::{PersistedState, RolloverCoordinator};
