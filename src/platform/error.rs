//! Platform error types
//!
//! This module defines error types for storage operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All storage backends map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// Flash region operation failed
    Flash(FlashError),
    /// Metadata store operation failed
    Metadata(MetadataError),
}

/// Flash-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Erase operation failed
    EraseFailed,
    /// Write operation failed
    WriteFailed,
    /// Read operation failed
    ReadFailed,
    /// Invalid address (out of bounds or misaligned)
    InvalidAddress,
    /// Verify failed (data mismatch after write)
    VerifyFailed,
}

/// Metadata store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MetadataError {
    /// Reading a value failed
    ReadFailed,
    /// Staging a value failed
    WriteFailed,
    /// Making staged values durable failed
    CommitFailed,
    /// Key exists with a different value type
    TypeMismatch,
    /// No room for another key
    StoreFull,
    /// Key longer than the store accepts
    KeyTooLong,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Flash(e) => write!(f, "Flash error: {:?}", e),
            PlatformError::Metadata(e) => write!(f, "Metadata error: {:?}", e),
        }
    }
}

// From implementations for error conversion
impl From<FlashError> for PlatformError {
    fn from(error: FlashError) -> Self {
        PlatformError::Flash(error)
    }
}

impl From<MetadataError> for PlatformError {
    fn from(error: MetadataError) -> Self {
        PlatformError::Metadata(error)
    }
}
