//! Counter configuration

/// Largest read-modify-write or scan buffer, in bytes
pub const MAX_CHUNK_BYTES: usize = 256;

/// Default write chunk (2048 bits per clear call)
pub const DEFAULT_WRITE_CHUNK_BYTES: usize = 256;

/// Default recovery scan chunk
pub const DEFAULT_SCAN_CHUNK_BYTES: usize = 256;

/// Monotonic counter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterConfig {
    /// Bytes rewritten by a single clear-bits call
    pub write_chunk_bytes: usize,
    /// Bytes read per step of the recovery scan
    pub scan_chunk_bytes: usize,
    /// Read back every clear-bits write and compare
    pub verify_writes: bool,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            write_chunk_bytes: DEFAULT_WRITE_CHUNK_BYTES,
            scan_chunk_bytes: DEFAULT_SCAN_CHUNK_BYTES,
            verify_writes: false,
        }
    }
}

impl CounterConfig {
    /// Most bits a single clear-bits call may touch
    pub fn chunk_capacity_bits(&self) -> u32 {
        (self.write_chunk_bytes * 8) as u32
    }

    /// Validate chunk sizes against the fixed buffer capacity
    ///
    /// # Returns
    ///
    /// true if both chunk sizes are within `1..=MAX_CHUNK_BYTES`
    pub fn is_valid(&self) -> bool {
        let in_range = |n: usize| (1..=MAX_CHUNK_BYTES).contains(&n);
        in_range(self.write_chunk_bytes) && in_range(self.scan_chunk_bytes)
    }
}
