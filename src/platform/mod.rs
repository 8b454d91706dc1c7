//! Platform abstraction layer
//!
//! This module isolates the storage collaborators of the counter: erase-block
//! regions found by label and the metadata key-value store.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FlashError, MetadataError, PlatformError, Result};
pub use traits::{MetadataStore, RegionInterface, RegionProvider};
