//! Metadata key derivation
//!
//! Every counter keeps two entries in the metadata store: its persisted base
//! value and its rollover phase. Both keys are derived from the region label
//! so that the same label always finds the same entries after a restart.
//!
//! # Key Format
//!
//! ```text
//! b_<fnv1a32(label) as 8 lowercase hex digits>   base value (i64)
//! p_<fnv1a32(label) as 8 lowercase hex digits>   rollover phase (u8)
//! ```

use core::fmt::{self, Write};
use heapless::String;

/// Key buffer capacity, including room for a C-style terminator
pub const KEY_CAPACITY: usize = 16;

/// Longest key the metadata store accepts
pub const MAX_KEY_LEN: usize = KEY_CAPACITY - 1;

/// Prefix of the base value key
pub const BASE_KEY_PREFIX: &str = "b_";

/// Prefix of the rollover phase key
pub const PENDING_KEY_PREFIX: &str = "p_";

/// Metadata key string
pub type MetaKey = String<KEY_CAPACITY>;

/// Key derivation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Region label is empty
    EmptyLabel,
    /// Formatted key does not fit the metadata key budget
    KeyTooLong,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::EmptyLabel => write!(f, "region label is empty"),
            KeyError::KeyTooLong => write!(f, "metadata key exceeds {} characters", MAX_KEY_LEN),
        }
    }
}

/// Pair of metadata keys owned by one counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterKeys {
    /// Key holding the signed base value
    pub base: MetaKey,
    /// Key holding the rollover phase flag
    pub pending: MetaKey,
}

impl CounterKeys {
    /// Derive both keys for a region label
    ///
    /// # Errors
    ///
    /// - [`KeyError::EmptyLabel`] for an empty label
    /// - [`KeyError::KeyTooLong`] if a formatted key would not fit
    pub fn derive(label: &str) -> Result<Self, KeyError> {
        if label.is_empty() {
            return Err(KeyError::EmptyLabel);
        }

        let hash = fnv1a32(label);
        Ok(Self {
            base: format_key(BASE_KEY_PREFIX, hash)?,
            pending: format_key(PENDING_KEY_PREFIX, hash)?,
        })
    }
}

/// FNV-1a hash (32-bit) over the bytes of `text`
pub fn fnv1a32(text: &str) -> u32 {
    const FNV_OFFSET_BASIS: u32 = 2166136261;
    const FNV_PRIME: u32 = 16777619;

    let mut hash = FNV_OFFSET_BASIS;
    for byte in text.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn format_key(prefix: &str, hash: u32) -> Result<MetaKey, KeyError> {
    let mut key = MetaKey::new();
    write!(key, "{}{:08x}", prefix, hash).map_err(|_| KeyError::KeyTooLong)?;
    if key.len() > MAX_KEY_LEN {
        return Err(KeyError::KeyTooLong);
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a32_known_values() {
        assert_eq!(fnv1a32(""), 0x811c9dc5);
        assert_eq!(fnv1a32("a"), 0xe40c292c);
        assert_eq!(fnv1a32("foobar"), 0xbf9cf968);
    }

    #[test]
    fn test_derive_key_format() {
        let keys = CounterKeys::derive("a").unwrap();
        assert_eq!(keys.base.as_str(), "b_e40c292c");
        assert_eq!(keys.pending.as_str(), "p_e40c292c");
        assert_eq!(keys.base.len(), 10);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let first = CounterKeys::derive("flow_data0").unwrap();
        let second = CounterKeys::derive("flow_data0").unwrap();
        assert_eq!(first, second);
        assert_ne!(first.base, first.pending);
    }

    #[test]
    fn test_derive_rejects_empty_label() {
        assert_eq!(CounterKeys::derive(""), Err(KeyError::EmptyLabel));
    }

    #[test]
    fn test_long_labels_still_fit() {
        let label = "a_very_long_partition_label_that_exceeds_any_key_budget";
        let keys = CounterKeys::derive(label).unwrap();
        assert!(keys.base.len() <= MAX_KEY_LEN);
        assert!(keys.pending.len() <= MAX_KEY_LEN);
    }

    #[test]
    fn test_distinct_labels_get_distinct_keys() {
        // 1000 distinct pseudo-random short labels from a small LCG
        let mut seed: u32 = 0x1234_5678;
        let mut seen = heapless::Vec::<(String<12>, MetaKey), 1000>::new();

        while !seen.is_full() {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
            let len = 3 + (seed >> 28) as usize % 9;
            let mut label = String::<12>::new();
            for _ in 0..len {
                seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
                label.push((b'a' + ((seed >> 24) % 26) as u8) as char).unwrap();
            }
            if seen.iter().any(|(existing, _)| *existing == label) {
                continue;
            }

            let keys = CounterKeys::derive(&label).unwrap();
            assert!(
                seen.iter().all(|(_, base)| *base != keys.base),
                "key collision for {}",
                label
            );
            seen.push((label, keys.base)).unwrap();
        }
    }
}
