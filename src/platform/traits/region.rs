//! Erase-block region trait
//!
//! A region is a fixed-size extent of flash addressed from offset 0. It is
//! found by label in a partition table and used exclusively by one owner.

use crate::platform::Result;

/// Erase-block region interface
///
/// # Flash Characteristics
///
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1→0 (must erase first to reset to 1)
/// - Erase ranges must be aligned to the region's block size
/// - Operations are blocking
///
/// # Safety Invariants
///
/// - Only one owner per region handle (no concurrent access)
/// - Offsets are relative to the start of the region
pub trait RegionInterface {
    /// Read `buf.len()` bytes starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range
    /// is outside the region.
    /// Returns `PlatformError::Flash(FlashError::ReadFailed)` if the read fails.
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `offset`
    ///
    /// Clear-only: the resulting byte is the AND of the old byte and `data`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range
    /// is outside the region.
    /// Returns `PlatformError::Flash(FlashError::WriteFailed)` if the write fails.
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes starting at `offset`, setting them to 0xFF
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range
    /// is outside the region or not block-aligned.
    /// Returns `PlatformError::Flash(FlashError::EraseFailed)` if the erase fails.
    fn erase(&mut self, offset: u32, size: u32) -> Result<()>;

    /// Minimum erasable unit in bytes
    fn block_size(&self) -> u32;

    /// Region size in bytes, fixed once opened
    fn size(&self) -> u32;
}

/// Lookup of regions by label
pub trait RegionProvider {
    /// Region handle type
    type Region: RegionInterface;

    /// Find the region with the given label
    ///
    /// Returns `None` if no region carries that label.
    fn find(&mut self, label: &str) -> Option<Self::Region>;
}

impl<T: RegionInterface + ?Sized> RegionInterface for &mut T {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        (**self).read(offset, buf)
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        (**self).write(offset, data)
    }

    fn erase(&mut self, offset: u32, size: u32) -> Result<()> {
        (**self).erase(offset, size)
    }

    fn block_size(&self) -> u32 {
        (**self).block_size()
    }

    fn size(&self) -> u32 {
        (**self).size()
    }
}
