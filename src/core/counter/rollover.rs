//! Crash-safe region rollover
//!
//! Once every bit of a region is used, the region has to be erased before
//! the counter can advance. The erase cannot be rolled back, so the count
//! held by the region is first folded into the persisted base value:
//!
//! 1. `new_base = base_value + used_bits`
//! 2. persist `(new_base, Pending)` and commit
//! 3. erase the region
//! 4. `used_bits = 0`
//! 5. persist `(new_base, CompletedRollover)` and commit
//!
//! A restart anywhere after step 2 finds `Pending` and replays 3-5. No bits
//! are cleared while `Pending` is durable, so the replay can neither lose
//! nor double count a step.

use super::allocator::BitAllocator;
use super::error::Result;
use crate::platform::{MetadataStore, RegionInterface};
use flow_counter_core::counter::{CounterKeys, RolloverPhase};

/// Counter state kept in the metadata store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedState {
    /// Signed base value
    pub base_value: i64,
    /// Rollover phase
    pub phase: RolloverPhase,
}

impl PersistedState {
    /// Load the persisted state for `keys`
    ///
    /// A missing base value is a first-ever open: 0 is written and committed
    /// immediately. A missing phase reads as `Clean`.
    pub fn load<M: MetadataStore>(metadata: &mut M, keys: &CounterKeys) -> Result<Self> {
        let base_value = match metadata.get_i64(&keys.base)? {
            Some(base) => base,
            None => {
                crate::log_info!("No base value under {}, starting from 0", keys.base.as_str());
                metadata.set_i64(&keys.base, 0)?;
                metadata.commit()?;
                0
            }
        };

        let phase = metadata
            .get_u8(&keys.pending)?
            .map(RolloverPhase::from_flag)
            .unwrap_or_default();

        Ok(Self { base_value, phase })
    }

    /// Persist base value and phase in a single commit
    pub fn store<M: MetadataStore>(&self, metadata: &mut M, keys: &CounterKeys) -> Result<()> {
        metadata.set_i64(&keys.base, self.base_value)?;
        metadata.set_u8(&keys.pending, self.phase.to_flag())?;
        metadata.commit()?;
        Ok(())
    }

    /// Persist like [`Self::store`], restaging the previous values on failure
    ///
    /// A failed commit leaves staged values behind, and any later commit on
    /// the same store would make them durable. Restaging keeps a failed
    /// update from taking effect behind the caller's back.
    pub fn replace<M: MetadataStore>(&self, metadata: &mut M, keys: &CounterKeys) -> Result<()> {
        let previous = Self {
            base_value: metadata.get_i64(&keys.base)?.unwrap_or(0),
            phase: metadata
                .get_u8(&keys.pending)?
                .map(RolloverPhase::from_flag)
                .unwrap_or_default(),
        };

        match self.store(metadata, keys) {
            Ok(()) => Ok(()),
            Err(e) => {
                let restaged = metadata
                    .set_i64(&keys.base, previous.base_value)
                    .and_then(|()| metadata.set_u8(&keys.pending, previous.phase.to_flag()));
                if restaged.is_err() {
                    crate::log_error!("Failed to restage base {}", previous.base_value);
                }
                Err(e)
            }
        }
    }
}

/// Executes the two-phase rollover against one region and metadata store
pub struct RolloverCoordinator<'a, R: RegionInterface, M: MetadataStore> {
    allocator: &'a mut BitAllocator<R>,
    metadata: &'a mut M,
    keys: &'a CounterKeys,
}

impl<'a, R: RegionInterface, M: MetadataStore> RolloverCoordinator<'a, R, M> {
    /// Create a coordinator for one rollover attempt
    pub fn new(
        allocator: &'a mut BitAllocator<R>,
        metadata: &'a mut M,
        keys: &'a CounterKeys,
    ) -> Self {
        Self {
            allocator,
            metadata,
            keys,
        }
    }

    /// Steps 1-2: fold the used bits into a new base and mark the rollover pending
    ///
    /// Returns the new base value. Nothing in memory changes; on failure the
    /// counter stays in its pre-rollover state.
    pub fn begin(&mut self, base_value: i64) -> Result<i64> {
        let new_base = base_value + self.allocator.used_bits() as i64;
        PersistedState {
            base_value: new_base,
            phase: RolloverPhase::Pending,
        }
        .replace(self.metadata, self.keys)?;

        crate::log_info!(
            "Rollover pending: {} bits folded into base {}",
            self.allocator.used_bits(),
            new_base
        );
        Ok(new_base)
    }

    /// Steps 3-4: erase the region and free every bit
    ///
    /// Safe to repeat: erasing an erased region is a no-op and erasing a
    /// partially erased one finishes it.
    pub fn erase(&mut self) -> Result<()> {
        self.allocator.erase_all()
    }

    /// Step 5: close the rollover window
    pub fn finish(&mut self, new_base: i64) -> Result<()> {
        PersistedState {
            base_value: new_base,
            phase: RolloverPhase::CompletedRollover,
        }
        .store(self.metadata, self.keys)?;

        crate::log_info!("Rollover complete, base {}", new_base);
        Ok(())
    }
}
