//! Platform abstraction traits
//!
//! This module defines the storage traits that platform implementations must provide.

pub mod metadata;
pub mod region;

// Re-export trait interfaces
pub use metadata::MetadataStore;
pub use region::{RegionInterface, RegionProvider};
