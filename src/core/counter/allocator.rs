//! Bit allocator
//!
//! Tracks how many bits of a region are used and clears further bits in
//! bounded read-modify-write chunks. Bits are consumed in order from the
//! start of the region, so the used count alone locates the next free bit.

use super::error::{CounterError, Result};
use crate::platform::{FlashError, RegionInterface};
use flow_counter_core::counter::{
    clear_bit_range, count_cleared_bits, ByteSpan, CounterConfig, MAX_CHUNK_BYTES,
};

/// Allocator over one erase-block region
pub struct BitAllocator<R: RegionInterface> {
    /// Region handle
    region: R,
    /// Bits currently cleared, counted from the region start
    used_bits: u32,
    /// Region size in bits
    total_bits: u32,
    /// Bytes rewritten per clear call
    write_chunk_bytes: usize,
    /// Bytes read per recovery scan step
    scan_chunk_bytes: usize,
    /// Read back and compare every write
    verify_writes: bool,
}

impl<R: RegionInterface> BitAllocator<R> {
    /// Bind an allocator to a region
    ///
    /// `used_bits` starts at 0; call [`Self::recovery_scan`] to load it from
    /// the region contents.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `config` is invalid
    /// - `InvalidSize` if the region is empty, too large to address in bits
    ///   or not a whole number of erase blocks
    pub fn new(region: R, config: &CounterConfig) -> Result<Self> {
        if !config.is_valid() {
            return Err(CounterError::InvalidArgument);
        }

        // Rollover erases the region in one call
        let block_size = region.block_size();
        if block_size == 0 || !region.size().is_multiple_of(block_size) {
            return Err(CounterError::InvalidSize);
        }

        let total_bits = region
            .size()
            .checked_mul(8)
            .filter(|&bits| bits > 0)
            .ok_or(CounterError::InvalidSize)?;

        Ok(Self {
            region,
            used_bits: 0,
            total_bits,
            write_chunk_bytes: config.write_chunk_bytes,
            scan_chunk_bytes: config.scan_chunk_bytes,
            verify_writes: config.verify_writes,
        })
    }

    /// Bits currently used
    pub fn used_bits(&self) -> u32 {
        self.used_bits
    }

    /// Region size in bits
    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    /// Bits still available before a rollover
    pub fn free_bits(&self) -> u32 {
        self.total_bits - self.used_bits
    }

    /// Check if every bit of the region is used
    pub fn is_exhausted(&self) -> bool {
        self.used_bits >= self.total_bits
    }

    /// Most bits a single clear call starting at `start_bit` may cover
    ///
    /// An unaligned start shares its first byte with earlier bits, so the
    /// capacity shrinks by the bits before it in that byte.
    pub fn chunk_capacity_at(&self, start_bit: u32) -> u32 {
        (self.write_chunk_bytes * 8) as u32 - start_bit % 8
    }

    /// Clear `count` more bits at the end of the used range
    ///
    /// `used_bits` only advances once the write has succeeded.
    pub fn allocate(&mut self, count: u32) -> Result<()> {
        self.clear_bits_range(self.used_bits, count)?;
        self.used_bits += count;
        Ok(())
    }

    /// Clear bits `[start_bit, start_bit + count)` in the region
    ///
    /// Reads the covering bytes, ANDs out the requested bits and writes the
    /// bytes back. Bits outside the range keep their current value, so
    /// repeating a call after an interrupted write produces the same bytes.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the range extends past the region
    /// - `InvalidSize` if the covering bytes exceed the write chunk
    /// - `Storage` for read/write failures or a verify mismatch
    pub fn clear_bits_range(&mut self, start_bit: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        if start_bit >= self.total_bits || count > self.total_bits - start_bit {
            return Err(CounterError::InvalidArgument);
        }

        let span = ByteSpan::covering(start_bit, count);
        let len = span.len as usize;
        if len > self.write_chunk_bytes {
            return Err(CounterError::InvalidSize);
        }

        let mut buffer = [0u8; MAX_CHUNK_BYTES];
        let bytes = &mut buffer[..len];
        self.region.read(span.start, bytes)?;

        clear_bit_range(bytes, span.start, start_bit, start_bit + count);

        self.region.write(span.start, bytes)?;

        if self.verify_writes {
            self.verify_written_bytes(span.start, bytes)?;
        }

        Ok(())
    }

    /// Recompute `used_bits` from the region contents
    ///
    /// Counts every cleared bit in the region. Returns the new count.
    pub fn recovery_scan(&mut self) -> Result<u32> {
        let size = self.region.size();
        let mut buffer = [0u8; MAX_CHUNK_BYTES];
        let mut used = 0u32;
        let mut offset = 0u32;

        while offset < size {
            let len = self.scan_chunk_bytes.min((size - offset) as usize);
            let chunk = &mut buffer[..len];
            self.region.read(offset, chunk)?;
            used += count_cleared_bits(chunk);
            offset += len as u32;
        }

        self.used_bits = used;
        crate::log_debug!("Recovery scan: {} of {} bits used", used, self.total_bits);
        Ok(used)
    }

    /// Erase the whole region and mark every bit free
    pub fn erase_all(&mut self) -> Result<()> {
        let size = self.region.size();
        self.region.erase(0, size)?;
        self.used_bits = 0;
        Ok(())
    }

    /// Mark the in-memory count as empty without touching the region
    ///
    /// Used when a pending rollover is replayed: the persisted base already
    /// holds every bit consumed before the erase started.
    pub fn forget_used(&mut self) {
        self.used_bits = 0;
    }

    fn verify_written_bytes(&mut self, start_byte: u32, expected: &[u8]) -> Result<()> {
        let mut buffer = [0u8; MAX_CHUNK_BYTES];
        let actual = &mut buffer[..expected.len()];
        self.region.read(start_byte, actual)?;

        if let Some(offset) = expected.iter().zip(actual.iter()).position(|(e, a)| e != a) {
            crate::log_error!(
                "Verify mismatch: start_byte={} bytes={} mismatch_offset={} expected={} actual={}",
                start_byte,
                expected.len() as u32,
                offset as u32,
                expected[offset],
                actual[offset]
            );
            return Err(CounterError::Storage(FlashError::VerifyFailed.into()));
        }

        Ok(())
    }
}
