//! Counter error types

use crate::platform::PlatformError;
use core::fmt;
use flow_counter_core::counter::KeyError;

/// Errors returned by the monotonic counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterError {
    /// Empty label, out-of-range bit range or invalid configuration
    InvalidArgument,
    /// Label does not resolve to a region
    NotFound,
    /// Operation attempted before a successful `init`, or `init` repeated
    InvalidState,
    /// Derived key or buffer exceeds its fixed capacity
    InvalidSize,
    /// Region or metadata store failure, passed through unchanged
    Storage(PlatformError),
}

/// Result type for counter operations
pub type Result<T> = core::result::Result<T, CounterError>;

impl fmt::Display for CounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterError::InvalidArgument => write!(f, "invalid argument"),
            CounterError::NotFound => write!(f, "region not found"),
            CounterError::InvalidState => write!(f, "counter not in a valid state for this operation"),
            CounterError::InvalidSize => write!(f, "size exceeds fixed capacity"),
            CounterError::Storage(e) => write!(f, "storage failure: {}", e),
        }
    }
}

impl From<PlatformError> for CounterError {
    fn from(error: PlatformError) -> Self {
        CounterError::Storage(error)
    }
}

impl From<KeyError> for CounterError {
    fn from(error: KeyError) -> Self {
        match error {
            KeyError::EmptyLabel => CounterError::InvalidArgument,
            KeyError::KeyTooLong => CounterError::InvalidSize,
        }
    }
}
