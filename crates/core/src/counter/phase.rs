//! Persisted rollover phase
//!
//! A rollover moves through three persisted states:
//!
//! ```text
//! Clean ──begin──▶ Pending ──erase + commit──▶ CompletedRollover
//!   ▲                                               │
//!   └──────────────── (reset, next init) ───────────┘
//! ```
//!
//! `Pending` means the base value already contains every bit consumed
//! before the erase, so the region may be erased again without losing or
//! double counting anything.

/// Rollover phase as stored in the metadata flag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolloverPhase {
    /// No rollover in flight
    #[default]
    Clean,
    /// Base value folded in, region erase not yet confirmed
    Pending,
    /// Region erased and base value final
    CompletedRollover,
}

impl RolloverPhase {
    /// Flag byte written to the metadata store
    pub fn to_flag(self) -> u8 {
        match self {
            RolloverPhase::Clean => 0,
            RolloverPhase::Pending => 1,
            RolloverPhase::CompletedRollover => 2,
        }
    }

    /// Decode a stored flag byte
    ///
    /// Any value other than 0 or 2 decodes as `Pending`.
    pub fn from_flag(flag: u8) -> Self {
        match flag {
            0 => RolloverPhase::Clean,
            2 => RolloverPhase::CompletedRollover,
            _ => RolloverPhase::Pending,
        }
    }

    /// Check if an erase must be replayed before the region can be trusted
    pub fn is_pending(self) -> bool {
        self == RolloverPhase::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_encoding() {
        assert_eq!(RolloverPhase::Clean.to_flag(), 0);
        assert_eq!(RolloverPhase::Pending.to_flag(), 1);
        assert_eq!(RolloverPhase::CompletedRollover.to_flag(), 2);
    }

    #[test]
    fn test_flag_decoding() {
        assert_eq!(RolloverPhase::from_flag(0), RolloverPhase::Clean);
        assert_eq!(RolloverPhase::from_flag(1), RolloverPhase::Pending);
        assert_eq!(
            RolloverPhase::from_flag(2),
            RolloverPhase::CompletedRollover
        );
        assert_eq!(RolloverPhase::from_flag(0xFF), RolloverPhase::Pending);
    }

    #[test]
    fn test_only_pending_requires_replay() {
        assert!(!RolloverPhase::Clean.is_pending());
        assert!(RolloverPhase::Pending.is_pending());
        assert!(!RolloverPhase::CompletedRollover.is_pending());
        assert_eq!(RolloverPhase::default(), RolloverPhase::Clean);
    }
}
