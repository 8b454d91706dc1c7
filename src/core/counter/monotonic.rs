//! Flash-backed monotonic counter
//!
//! The counter value is `base_value + used_bits`, where `base_value` lives in
//! the metadata store and `used_bits` is the number of cleared bits in an
//! erase-block region. Incrementing clears more bits; the metadata store is
//! only written on first open, on `reset` and around a rollover.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──init──▶ Ready
//! ```
//!
//! `Ready` lasts until the instance is dropped. A failed `init` leaves the
//! counter `Uninitialized`.

use super::allocator::BitAllocator;
use super::error::{CounterError, Result};
use super::rollover::{PersistedState, RolloverCoordinator};
use crate::platform::{MetadataStore, RegionInterface, RegionProvider};
use flow_counter_core::counter::{CounterConfig, CounterKeys, RolloverPhase};

/// State bound to an open region
struct Bound<R: RegionInterface> {
    /// Metadata keys derived from the region label
    keys: CounterKeys,
    /// Bit allocator over the region
    allocator: BitAllocator<R>,
    /// Persisted base value (may be negative after a reset)
    base_value: i64,
    /// Base of a rollover whose pending flag is still durable
    pending_base: Option<i64>,
}

enum CounterState<R: RegionInterface> {
    Uninitialized,
    Ready(Bound<R>),
}

/// Monotonic counter over one erase-block region
///
/// # Example
///
/// ```
/// use flow_counter::platform::mock::{MockMetadataStore, MockPartitionTable};
/// use flow_counter::MonotonicCounter;
///
/// let mut table = MockPartitionTable::new();
/// table.add("flow_data0", 32);
///
/// let mut counter = MonotonicCounter::new(MockMetadataStore::new("flash_ctr"));
/// counter.init(&mut table, "flow_data0").unwrap();
/// counter.increment(200).unwrap();
/// assert_eq!(counter.value(), 200);
/// ```
pub struct MonotonicCounter<R: RegionInterface, M: MetadataStore> {
    /// Metadata store holding base value and rollover phase
    metadata: M,
    /// Chunking and verification settings
    config: CounterConfig,
    /// Lifecycle state
    state: CounterState<R>,
}

impl<R: RegionInterface, M: MetadataStore> MonotonicCounter<R, M> {
    /// Create an uninitialized counter with the default configuration
    pub fn new(metadata: M) -> Self {
        Self {
            metadata,
            config: CounterConfig::default(),
            state: CounterState::Uninitialized,
        }
    }

    /// Create an uninitialized counter with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the chunk sizes are out of range.
    pub fn with_config(metadata: M, config: CounterConfig) -> Result<Self> {
        if !config.is_valid() {
            return Err(CounterError::InvalidArgument);
        }

        Ok(Self {
            metadata,
            config,
            state: CounterState::Uninitialized,
        })
    }

    /// Bind the counter to the region labelled `label`
    ///
    /// Loads the persisted base value (creating it on first open), replays an
    /// interrupted rollover if one is pending, and otherwise scans the region
    /// to recover the used bit count.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty label
    /// - `NotFound` if no region carries `label`
    /// - `InvalidState` if the counter is already initialized
    /// - `InvalidSize` if the derived keys or region size exceed their limits
    /// - `Storage` for any region or metadata failure
    pub fn init<P>(&mut self, regions: &mut P, label: &str) -> Result<()>
    where
        P: RegionProvider<Region = R>,
    {
        if matches!(self.state, CounterState::Ready(_)) {
            return Err(CounterError::InvalidState);
        }

        if label.is_empty() {
            return Err(CounterError::InvalidArgument);
        }

        let region = regions.find(label).ok_or(CounterError::NotFound)?;
        let keys = CounterKeys::derive(label)?;
        let allocator = BitAllocator::new(region, &self.config)?;

        let mut bound = Bound {
            keys,
            allocator,
            base_value: 0,
            pending_base: None,
        };

        match bound.recover(&mut self.metadata) {
            Ok(()) => {
                crate::log_info!(
                    "Counter {} ready: base={} used={}/{} bits",
                    label,
                    bound.base_value,
                    bound.allocator.used_bits(),
                    bound.allocator.total_bits()
                );
                self.state = CounterState::Ready(bound);
                Ok(())
            }
            Err(e) => {
                crate::log_error!("Counter {} init failed", label);
                Err(e)
            }
        }
    }

    /// Advance the counter by `steps`
    ///
    /// Clears bits in chunks of at most the configured write chunk, rolling
    /// the region over whenever it fills up. On error the counter keeps every
    /// step that was durably written before the failure.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the counter is not initialized
    /// - `Storage` for any region or metadata failure
    pub fn increment(&mut self, steps: u32) -> Result<()> {
        let CounterState::Ready(bound) = &mut self.state else {
            return Err(CounterError::InvalidState);
        };

        let mut remaining = steps;
        while remaining > 0 {
            if bound.pending_base.is_some() || bound.allocator.is_exhausted() {
                bound.roll_over(&mut self.metadata)?;
            }

            let allocator = &mut bound.allocator;
            let block = remaining
                .min(allocator.free_bits())
                .min(allocator.chunk_capacity_at(allocator.used_bits()));

            if let Err(e) = allocator.allocate(block) {
                crate::log_error!(
                    "Failed to clear {} bits at {}",
                    block,
                    allocator.used_bits()
                );
                return Err(e);
            }
            remaining -= block;
        }

        Ok(())
    }

    /// Make the counter read 0 from now on
    ///
    /// Persists `base_value = -used_bits` without touching the region: the
    /// bits already cleared are pre-paid against the negative base and the
    /// next increment continues at the same physical bit.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the counter is not initialized
    /// - `Storage` for any region or metadata failure
    pub fn reset(&mut self) -> Result<()> {
        let CounterState::Ready(bound) = &mut self.state else {
            return Err(CounterError::InvalidState);
        };

        if bound.pending_base.is_some() {
            bound.roll_over(&mut self.metadata)?;
        }

        let new_base = bound.base_value - bound.signed_value();
        PersistedState {
            base_value: new_base,
            phase: RolloverPhase::Clean,
        }
        .replace(&mut self.metadata, &bound.keys)?;

        bound.base_value = new_base;
        crate::log_info!("Counter reset, base {}", new_base);
        Ok(())
    }

    /// Current counter value
    ///
    /// Pure: performs no I/O. Reads 0 before `init`.
    pub fn value(&self) -> u64 {
        match &self.state {
            CounterState::Ready(bound) => bound.signed_value().max(0) as u64,
            CounterState::Uninitialized => 0,
        }
    }

    /// Check if `init` has completed
    pub fn is_ready(&self) -> bool {
        matches!(self.state, CounterState::Ready(_))
    }

    /// Used bits in the region, if initialized
    pub fn used_bits(&self) -> Option<u32> {
        self.bound().map(|b| b.allocator.used_bits())
    }

    /// Region size in bits, if initialized
    pub fn total_bits(&self) -> Option<u32> {
        self.bound().map(|b| b.allocator.total_bits())
    }

    /// Signed base value, if initialized
    pub fn base_value(&self) -> Option<i64> {
        self.bound().map(|b| b.base_value)
    }

    /// Metadata keys in use, if initialized
    pub fn keys(&self) -> Option<&CounterKeys> {
        self.bound().map(|b| &b.keys)
    }

    /// Metadata store (for diagnostics)
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    fn bound(&self) -> Option<&Bound<R>> {
        match &self.state {
            CounterState::Ready(bound) => Some(bound),
            CounterState::Uninitialized => None,
        }
    }
}

impl<R: RegionInterface> Bound<R> {
    fn signed_value(&self) -> i64 {
        self.base_value + self.allocator.used_bits() as i64
    }

    /// Bring in-memory state in line with what is persisted
    fn recover<M: MetadataStore>(&mut self, metadata: &mut M) -> Result<()> {
        let persisted = PersistedState::load(metadata, &self.keys)?;
        self.base_value = persisted.base_value;

        if persisted.phase.is_pending() {
            crate::log_warn!(
                "Rollover pending at boot, replaying erase (base {})",
                persisted.base_value
            );
            self.allocator.forget_used();
            self.pending_base = Some(persisted.base_value);
            self.roll_over(metadata)
        } else {
            self.allocator.recovery_scan()?;
            Ok(())
        }
    }

    /// Run or resume a rollover
    ///
    /// `base_value` is only replaced once the erase has succeeded, so
    /// `signed_value` never changes across a rollover.
    fn roll_over<M: MetadataStore>(&mut self, metadata: &mut M) -> Result<()> {
        let mut coordinator = RolloverCoordinator::new(&mut self.allocator, metadata, &self.keys);

        let new_base = match self.pending_base {
            Some(base) => base,
            None => {
                let base = coordinator.begin(self.base_value)?;
                self.pending_base = Some(base);
                base
            }
        };

        coordinator.erase()?;
        self.base_value = new_base;
        coordinator.finish(new_base)?;
        self.pending_base = None;
        Ok(())
    }
}
