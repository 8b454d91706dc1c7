//! Metadata store trait
//!
//! A small persistent key-value store holding integers under short string
//! keys. Values set through the trait only become durable on `commit`.

use crate::platform::Result;

/// Persistent key-value store interface
///
/// Keys are at most [`flow_counter_core::counter::MAX_KEY_LEN`] characters.
/// Getters return `Ok(None)` for keys that were never set.
pub trait MetadataStore {
    /// Read an 8-bit value
    fn get_u8(&mut self, key: &str) -> Result<Option<u8>>;

    /// Read a 32-bit value
    fn get_u32(&mut self, key: &str) -> Result<Option<u32>>;

    /// Read a signed 64-bit value
    fn get_i64(&mut self, key: &str) -> Result<Option<i64>>;

    /// Stage an 8-bit value
    fn set_u8(&mut self, key: &str, value: u8) -> Result<()>;

    /// Stage a 32-bit value
    fn set_u32(&mut self, key: &str, value: u32) -> Result<()>;

    /// Stage a signed 64-bit value
    fn set_i64(&mut self, key: &str, value: i64) -> Result<()>;

    /// Make every staged value durable
    fn commit(&mut self) -> Result<()>;
}

impl<T: MetadataStore + ?Sized> MetadataStore for &mut T {
    fn get_u8(&mut self, key: &str) -> Result<Option<u8>> {
        (**self).get_u8(key)
    }

    fn get_u32(&mut self, key: &str) -> Result<Option<u32>> {
        (**self).get_u32(key)
    }

    fn get_i64(&mut self, key: &str) -> Result<Option<i64>> {
        (**self).get_i64(key)
    }

    fn set_u8(&mut self, key: &str, value: u8) -> Result<()> {
        (**self).set_u8(key, value)
    }

    fn set_u32(&mut self, key: &str, value: u32) -> Result<()> {
        (**self).set_u32(key, value)
    }

    fn set_i64(&mut self, key: &str, value: i64) -> Result<()> {
        (**self).set_i64(key, value)
    }

    fn commit(&mut self) -> Result<()> {
        (**self).commit()
    }
}
