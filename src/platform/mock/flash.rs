//! Mock flash region implementation for testing
//!
//! Provides an in-memory erase-block region for unit tests. Clones share the
//! same backing storage, so a test can drop a counter, "reboot", and open the
//! region again to see exactly what was durably written.

use crate::platform::{
    error::FlashError,
    traits::{RegionInterface, RegionProvider},
    Result,
};
use core::cell::RefCell;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

/// Default flash block size (4 KB)
const BLOCK_SIZE: u32 = 4096;

/// Storage operation selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOp {
    /// `read`
    Read,
    /// `write`
    Write,
    /// `erase`
    Erase,
}

#[derive(Debug)]
struct RegionState {
    /// Region contents (initialized to 0xFF - erased state)
    storage: Vec<u8>,
    /// Erase count per block (for wear validation)
    erase_counts: Vec<u32>,
    /// Number of successful write calls
    write_count: u32,
    /// Next write only lands halfway
    power_loss: bool,
    /// Next erase stops halfway and fails
    interrupt_erase: bool,
    /// Next operation of this kind fails without touching storage
    fail_next: Option<FlashOp>,
}

/// Mock flash region
///
/// Simulates a clear-only region in memory. Supports:
/// - Read/write/erase operations with flash bit semantics
/// - Erase count tracking per block
/// - Power-loss simulation (partial write)
/// - Interrupted erase simulation
/// - One-shot failure injection per operation
///
/// # Example
///
/// ```
/// use flow_counter::platform::mock::MockRegion;
/// use flow_counter::platform::traits::RegionInterface;
///
/// let mut region = MockRegion::new(32);
///
/// region.write(0, &[0x0F]).unwrap();
/// let mut buf = [0u8; 1];
/// region.read(0, &mut buf).unwrap();
/// assert_eq!(buf[0], 0x0F);
///
/// region.erase(0, 32).unwrap();
/// assert_eq!(region.erase_count(0), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockRegion {
    state: Rc<RefCell<RegionState>>,
    size: u32,
    block_size: u32,
}

impl MockRegion {
    /// Create an erased region of `size` bytes
    ///
    /// Uses the largest block size up to 4 KB that divides `size`, so regions
    /// smaller than 4 KB are a single erase block.
    pub fn new(size: u32) -> Self {
        let block_size = (1..=BLOCK_SIZE.min(size))
            .rev()
            .find(|&block| size.is_multiple_of(block))
            .unwrap_or(1);
        Self::with_block_size(size, block_size)
    }

    /// Create an erased region with an explicit erase block size
    ///
    /// `size` must be a non-zero multiple of `block_size`.
    pub fn with_block_size(size: u32, block_size: u32) -> Self {
        assert!(block_size > 0 && size.is_multiple_of(block_size));
        let state = RegionState {
            storage: vec![0xFF; size as usize],
            erase_counts: vec![0; (size / block_size) as usize],
            write_count: 0,
            power_loss: false,
            interrupt_erase: false,
            fail_next: None,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
            size,
            block_size,
        }
    }

    /// Get region contents (for test verification)
    pub fn contents(&self) -> Vec<u8> {
        self.state.borrow().storage.clone()
    }

    /// Number of bits currently reading as 0
    pub fn cleared_bits(&self) -> u32 {
        flow_counter_core::counter::count_cleared_bits(&self.state.borrow().storage)
    }

    /// Get erase count for the block containing `offset`
    pub fn erase_count(&self, offset: u32) -> u32 {
        let block_id = (offset / self.block_size) as usize;
        self.state.borrow().erase_counts[block_id]
    }

    /// Get total erase count across all blocks
    pub fn total_erase_count(&self) -> u32 {
        self.state.borrow().erase_counts.iter().sum()
    }

    /// Number of completed write calls
    pub fn write_count(&self) -> u32 {
        self.state.borrow().write_count
    }

    /// Overwrite raw bytes, bypassing flash semantics
    ///
    /// Used to model corruption or a half-finished erase.
    pub fn inject_raw(&self, offset: u32, data: &[u8]) {
        let start = offset as usize;
        self.state.borrow_mut().storage[start..start + data.len()].copy_from_slice(data);
    }

    /// Simulate power loss during next write operation
    ///
    /// The next write only stores the first half of its bytes and reports
    /// success, as if power dropped right after the call returned.
    pub fn simulate_power_loss(&self) {
        self.state.borrow_mut().power_loss = true;
    }

    /// Make the next erase stop halfway through and fail
    pub fn interrupt_next_erase(&self) {
        self.state.borrow_mut().interrupt_erase = true;
    }

    /// Make the next operation of kind `op` fail without side effects
    pub fn fail_next(&self, op: FlashOp) {
        self.state.borrow_mut().fail_next = Some(op);
    }

    fn take_failure(&self, op: FlashOp) -> bool {
        let mut state = self.state.borrow_mut();
        if state.fail_next == Some(op) {
            state.fail_next = None;
            return true;
        }
        false
    }

    fn check_range(&self, offset: u32, len: usize) -> Result<()> {
        if offset as usize + len > self.size as usize {
            return Err(FlashError::InvalidAddress.into());
        }
        Ok(())
    }
}

impl RegionInterface for MockRegion {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        self.check_range(offset, buf.len())?;
        if self.take_failure(FlashOp::Read) {
            return Err(FlashError::ReadFailed.into());
        }

        let state = self.state.borrow();
        let start = offset as usize;
        buf.copy_from_slice(&state.storage[start..start + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        self.check_range(offset, data.len())?;
        if self.take_failure(FlashOp::Write) {
            return Err(FlashError::WriteFailed.into());
        }

        let mut state = self.state.borrow_mut();
        let write_len = if state.power_loss {
            state.power_loss = false;
            data.len() / 2
        } else {
            data.len()
        };

        // Flash can only change bits from 1→0
        let start = offset as usize;
        for (cell, byte) in state.storage[start..start + write_len]
            .iter_mut()
            .zip(data)
        {
            *cell &= *byte;
        }
        state.write_count += 1;

        Ok(())
    }

    fn erase(&mut self, offset: u32, size: u32) -> Result<()> {
        self.check_range(offset, size as usize)?;
        if !offset.is_multiple_of(self.block_size) || !size.is_multiple_of(self.block_size) {
            return Err(FlashError::InvalidAddress.into());
        }
        if self.take_failure(FlashOp::Erase) {
            return Err(FlashError::EraseFailed.into());
        }

        let mut state = self.state.borrow_mut();
        let interrupted = state.interrupt_erase;
        state.interrupt_erase = false;

        let start = offset as usize;
        let erase_len = if interrupted {
            size as usize / 2
        } else {
            size as usize
        };
        state.storage[start..start + erase_len].fill(0xFF);

        let first_block = (offset / self.block_size) as usize;
        let block_count = (size / self.block_size) as usize;
        for count in &mut state.erase_counts[first_block..first_block + block_count] {
            *count += 1;
        }

        if interrupted {
            return Err(FlashError::EraseFailed.into());
        }
        Ok(())
    }

    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn size(&self) -> u32 {
        self.size
    }
}

/// Mock partition table mapping labels to regions
#[derive(Debug, Default)]
pub struct MockPartitionTable {
    regions: Vec<(String, MockRegion)>,
}

impl MockPartitionTable {
    /// Create an empty partition table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an erased region and return a handle sharing its storage
    pub fn add(&mut self, label: &str, size: u32) -> MockRegion {
        let region = MockRegion::new(size);
        self.regions.push((String::from(label), region.clone()));
        region
    }
}

impl RegionProvider for MockPartitionTable {
    type Region = MockRegion;

    fn find(&mut self, label: &str) -> Option<MockRegion> {
        self.regions
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, region)| region.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_region_read_write() {
        let mut region = MockRegion::new(64);

        let data = [0x50, 0x41, 0x52, 0x41];
        region.write(8, &data).unwrap();

        let mut buf = [0u8; 4];
        region.read(8, &mut buf).unwrap();
        assert_eq!(buf, data);
        assert_eq!(region.write_count(), 1);
    }

    #[test]
    fn test_mock_region_erase() {
        let mut region = MockRegion::new(256);
        region.write(0, &[0x55; 256]).unwrap();

        region.erase(0, 256).unwrap();

        assert!(region.contents().iter().all(|&b| b == 0xFF));
        assert_eq!(region.erase_count(0), 1);
    }

    #[test]
    fn test_mock_region_write_only_clears_bits() {
        let mut region = MockRegion::new(16);

        region.write(0, &[0x0F]).unwrap();
        region.write(0, &[0xFF]).unwrap();

        let mut buf = [0u8; 1];
        region.read(0, &mut buf).unwrap();
        assert_eq!(buf[0], 0x0F); // Still 0x0F, not 0xFF
    }

    #[test]
    fn test_mock_region_out_of_bounds() {
        let mut region = MockRegion::new(16);
        let mut buf = [0u8; 4];
        assert!(region.read(14, &mut buf).is_err());
        assert!(region.write(16, &[0x00]).is_err());
        assert!(region.erase(0, 32).is_err());
    }

    #[test]
    fn test_mock_region_unaligned_erase() {
        let mut region = MockRegion::with_block_size(8192, 4096);
        assert!(region.erase(0x100, 4096).is_err());
        assert!(region.erase(0, 1024).is_err());

        region.erase(4096, 4096).unwrap();
        assert_eq!(region.erase_count(0), 0);
        assert_eq!(region.erase_count(4096), 1);
        assert_eq!(region.total_erase_count(), 1);
    }

    #[test]
    fn test_mock_region_block_size_divides_size() {
        assert_eq!(MockRegion::new(32).block_size(), 32);
        assert_eq!(MockRegion::new(8192).block_size(), 4096);

        let mut region = MockRegion::new(5000);
        assert_eq!(region.block_size(), 2500);
        region.erase(0, 5000).unwrap();
        assert_eq!(region.total_erase_count(), 2);
    }

    #[test]
    fn test_mock_region_power_loss() {
        let mut region = MockRegion::new(256);

        region.simulate_power_loss();
        region.write(0, &[0x55; 256]).unwrap();

        let contents = region.contents();
        assert_eq!(&contents[..128], &[0x55; 128]);
        assert_eq!(&contents[128..], &[0xFF; 128]);
    }

    #[test]
    fn test_mock_region_interrupted_erase() {
        let mut region = MockRegion::new(32);
        region.write(0, &[0x00; 32]).unwrap();

        region.interrupt_next_erase();
        assert_eq!(
            region.erase(0, 32),
            Err(FlashError::EraseFailed.into())
        );

        let contents = region.contents();
        assert_eq!(&contents[..16], &[0xFF; 16]);
        assert_eq!(&contents[16..], &[0x00; 16]);
    }

    #[test]
    fn test_mock_region_fail_next() {
        let mut region = MockRegion::new(32);
        region.fail_next(FlashOp::Write);

        assert_eq!(region.write(0, &[0x00]), Err(FlashError::WriteFailed.into()));
        assert_eq!(region.cleared_bits(), 0);

        // One-shot
        region.write(0, &[0x00]).unwrap();
        assert_eq!(region.cleared_bits(), 8);
    }

    #[test]
    fn test_clones_share_storage() {
        let mut region = MockRegion::new(32);
        let observer = region.clone();
        region.write(0, &[0xF0]).unwrap();
        assert_eq!(observer.cleared_bits(), 4);
    }

    #[test]
    fn test_partition_table_lookup() {
        let mut table = MockPartitionTable::new();
        let region = table.add("flow_data0", 32);
        region.inject_raw(0, &[0x00]);

        let found = table.find("flow_data0").unwrap();
        assert_eq!(found.size(), 32);
        assert_eq!(found.cleared_bits(), 8);
        assert!(table.find("missing").is_none());
    }
}
