//! Bit arithmetic for clear-only storage
//!
//! Bits are allocated from the start of a region in order: bit `n` lives in
//! byte `n / 8` at position `n % 8` (LSB first). An erased byte is `0xFF`,
//! so a "used" bit is a bit that reads as 0.

/// Byte range covering a bit range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    /// First byte touched
    pub start: u32,
    /// Number of bytes touched
    pub len: u32,
}

impl ByteSpan {
    /// Bytes covering bits `[start_bit, start_bit + count)`
    ///
    /// `count` must be non-zero.
    pub fn covering(start_bit: u32, count: u32) -> Self {
        let start = start_bit / 8;
        let end = (start_bit + count).div_ceil(8);
        Self {
            start,
            len: end - start,
        }
    }
}

/// Clear bits `[start_bit, end_bit)` in `bytes`
///
/// `bytes[0]` holds absolute bits `first_byte * 8 .. first_byte * 8 + 8`.
/// Bits outside the range are left untouched and no bit is ever set, so
/// applying the same mask twice yields the same bytes.
pub fn clear_bit_range(bytes: &mut [u8], first_byte: u32, start_bit: u32, end_bit: u32) {
    for (offset, byte) in bytes.iter_mut().enumerate() {
        let byte_first_bit = (first_byte + offset as u32) * 8;
        let from = start_bit.max(byte_first_bit);
        let to = end_bit.min(byte_first_bit + 8);
        if from >= to {
            continue;
        }

        *byte &= !range_mask(from - byte_first_bit, to - byte_first_bit);
    }
}

/// Number of cleared (0) bits in `bytes`
pub fn count_cleared_bits(bytes: &[u8]) -> u32 {
    bytes.iter().map(|b| (!b).count_ones()).sum()
}

/// Mask with bits `[from, to)` set, `0 <= from < to <= 8`
fn range_mask(from: u32, to: u32) -> u8 {
    let upper = if to >= 8 { 0xFFu16 } else { (1u16 << to) - 1 };
    let lower = (1u16 << from) - 1;
    (upper & !lower) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covering_span() {
        assert_eq!(ByteSpan::covering(0, 1), ByteSpan { start: 0, len: 1 });
        assert_eq!(ByteSpan::covering(0, 8), ByteSpan { start: 0, len: 1 });
        assert_eq!(ByteSpan::covering(7, 2), ByteSpan { start: 0, len: 2 });
        assert_eq!(ByteSpan::covering(200, 56), ByteSpan { start: 25, len: 7 });
        assert_eq!(ByteSpan::covering(0, 2048), ByteSpan { start: 0, len: 256 });
    }

    #[test]
    fn test_range_mask() {
        assert_eq!(range_mask(0, 8), 0xFF);
        assert_eq!(range_mask(0, 1), 0x01);
        assert_eq!(range_mask(3, 5), 0x18);
        assert_eq!(range_mask(7, 8), 0x80);
    }

    #[test]
    fn test_clear_preserves_neighbouring_bits() {
        // bits 0-2 already used
        let mut bytes = [0xF8u8, 0xFF];
        clear_bit_range(&mut bytes, 0, 3, 10);
        assert_eq!(bytes, [0x00, 0xFC]);
    }

    #[test]
    fn test_clear_never_sets_bits() {
        let mut bytes = [0x00u8];
        clear_bit_range(&mut bytes, 0, 2, 4);
        assert_eq!(bytes, [0x00]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut once = [0xFFu8; 4];
        clear_bit_range(&mut once, 10, 83, 101);
        let mut twice = once;
        clear_bit_range(&mut twice, 10, 83, 101);
        assert_eq!(once, twice);
        assert_eq!(count_cleared_bits(&once), 18);
    }

    #[test]
    fn test_count_cleared_bits() {
        assert_eq!(count_cleared_bits(&[]), 0);
        assert_eq!(count_cleared_bits(&[0xFF, 0xFF]), 0);
        assert_eq!(count_cleared_bits(&[0x00, 0xFE]), 9);
    }
}
