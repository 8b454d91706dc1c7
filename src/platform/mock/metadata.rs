//! Mock metadata store for testing
//!
//! Keeps a committed snapshot (what survives power loss) and a staged view
//! (what `set_*` calls have changed since the last commit). Keys are scoped
//! by the namespace the handle was opened with.

use crate::platform::{error::MetadataError, traits::MetadataStore, Result};
use core::cell::RefCell;
use flow_counter_core::counter::{MetaKey, MAX_KEY_LEN};
use heapless::index_map::FnvIndexMap;
use std::rc::Rc;

/// Maximum number of keys held by the mock store
pub const MAX_META_ENTRIES: usize = 32;

/// Stored value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaValue {
    /// 8-bit unsigned
    U8(u8),
    /// 32-bit unsigned
    U32(u32),
    /// 64-bit signed
    I64(i64),
}

/// Namespace and key
type ScopedKey = (MetaKey, MetaKey);

type MetaMap = FnvIndexMap<ScopedKey, MetaValue, MAX_META_ENTRIES>;

#[derive(Debug)]
struct PartitionState {
    /// Values visible to getters
    staged: MetaMap,
    /// Values that survive a reboot
    committed: MetaMap,
    /// Number of successful commits
    commit_count: u32,
    /// Commits left to succeed before one fails
    fail_commit_in: Option<u32>,
    /// Next set fails
    fail_next_set: bool,
    /// Next get fails
    fail_next_get: bool,
}

/// Mock metadata store
///
/// One handle is bound to one namespace. Handles opened with
/// [`MockMetadataStore::open_namespace`] and clones share the same backing
/// partition, so a test can reboot into a fresh counter or check that two
/// namespaces never see each other's keys. `commit` makes the staged values
/// of the handle's own namespace durable.
///
/// # Example
///
/// ```
/// use flow_counter::platform::mock::MockMetadataStore;
/// use flow_counter::platform::traits::MetadataStore;
///
/// let mut store = MockMetadataStore::new("flash_ctr");
/// store.set_i64("b_00000000", -5).unwrap();
/// store.commit().unwrap();
/// assert_eq!(store.get_i64("b_00000000").unwrap(), Some(-5));
/// ```
#[derive(Debug, Clone)]
pub struct MockMetadataStore {
    state: Rc<RefCell<PartitionState>>,
    namespace: MetaKey,
}

impl MockMetadataStore {
    /// Create an empty partition and open `namespace` on it
    ///
    /// # Panics
    ///
    /// If `namespace` is empty or longer than the key length limit.
    pub fn new(namespace: &str) -> Self {
        Self {
            state: Rc::new(RefCell::new(PartitionState {
                staged: MetaMap::new(),
                committed: MetaMap::new(),
                commit_count: 0,
                fail_commit_in: None,
                fail_next_set: false,
                fail_next_get: false,
            })),
            namespace: namespace_key(namespace),
        }
    }

    /// Open another namespace on the same partition
    ///
    /// # Panics
    ///
    /// If `namespace` is empty or longer than the key length limit.
    pub fn open_namespace(&self, namespace: &str) -> Self {
        Self {
            state: Rc::clone(&self.state),
            namespace: namespace_key(namespace),
        }
    }

    /// Namespace name
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Drop every uncommitted change, as a power cycle would
    pub fn simulate_reboot(&self) {
        let mut state = self.state.borrow_mut();
        state.staged = state.committed.clone();
    }

    /// Committed value for a key (for test verification)
    pub fn committed(&self, key: &str) -> Option<MetaValue> {
        let key = self.scoped(key).ok()?;
        self.state.borrow().committed.get(&key).copied()
    }

    /// Number of successful commits
    pub fn commit_count(&self) -> u32 {
        self.state.borrow().commit_count
    }

    /// Make the next commit fail
    pub fn fail_next_commit(&self) {
        self.fail_commit_after(0);
    }

    /// Let `successes` commits through, then fail the one after
    pub fn fail_commit_after(&self, successes: u32) {
        self.state.borrow_mut().fail_commit_in = Some(successes);
    }

    /// Make the next set fail
    pub fn fail_next_set(&self) {
        self.state.borrow_mut().fail_next_set = true;
    }

    /// Make the next get fail
    pub fn fail_next_get(&self) {
        self.state.borrow_mut().fail_next_get = true;
    }

    /// Commit a value directly, bypassing staging (for test setup)
    ///
    /// # Panics
    ///
    /// If the key is too long or the partition is full.
    pub fn insert_committed(&self, key: &str, value: MetaValue) {
        let key = self.scoped(key).expect("test key too long");
        let mut state = self.state.borrow_mut();
        let staged = state.staged.insert(key.clone(), value);
        let committed = state.committed.insert(key, value);
        assert!(staged.is_ok() && committed.is_ok(), "mock metadata store full");
    }

    fn scoped(&self, key: &str) -> Result<ScopedKey> {
        if key.len() > MAX_KEY_LEN {
            return Err(MetadataError::KeyTooLong.into());
        }
        let mut name = MetaKey::new();
        name.push_str(key)
            .map_err(|_| MetadataError::KeyTooLong)?;
        Ok((self.namespace.clone(), name))
    }

    fn get(&self, key: &str) -> Result<Option<MetaValue>> {
        let key = self.scoped(key)?;
        let mut state = self.state.borrow_mut();
        if state.fail_next_get {
            state.fail_next_get = false;
            return Err(MetadataError::ReadFailed.into());
        }
        Ok(state.staged.get(&key).copied())
    }

    fn set(&self, key: &str, value: MetaValue) -> Result<()> {
        let key = self.scoped(key)?;
        let mut state = self.state.borrow_mut();
        if state.fail_next_set {
            state.fail_next_set = false;
            return Err(MetadataError::WriteFailed.into());
        }

        state
            .staged
            .insert(key, value)
            .map_err(|_| MetadataError::StoreFull)?;
        Ok(())
    }
}

fn namespace_key(namespace: &str) -> MetaKey {
    let mut name = MetaKey::new();
    assert!(
        !namespace.is_empty() && namespace.len() <= MAX_KEY_LEN && name.push_str(namespace).is_ok(),
        "namespace must be 1..={} characters",
        MAX_KEY_LEN
    );
    name
}

impl MetadataStore for MockMetadataStore {
    fn get_u8(&mut self, key: &str) -> Result<Option<u8>> {
        match self.get(key)? {
            None => Ok(None),
            Some(MetaValue::U8(v)) => Ok(Some(v)),
            Some(_) => Err(MetadataError::TypeMismatch.into()),
        }
    }

    fn get_u32(&mut self, key: &str) -> Result<Option<u32>> {
        match self.get(key)? {
            None => Ok(None),
            Some(MetaValue::U32(v)) => Ok(Some(v)),
            Some(_) => Err(MetadataError::TypeMismatch.into()),
        }
    }

    fn get_i64(&mut self, key: &str) -> Result<Option<i64>> {
        match self.get(key)? {
            None => Ok(None),
            Some(MetaValue::I64(v)) => Ok(Some(v)),
            Some(_) => Err(MetadataError::TypeMismatch.into()),
        }
    }

    fn set_u8(&mut self, key: &str, value: u8) -> Result<()> {
        self.set(key, MetaValue::U8(value))
    }

    fn set_u32(&mut self, key: &str, value: u32) -> Result<()> {
        self.set(key, MetaValue::U32(value))
    }

    fn set_i64(&mut self, key: &str, value: i64) -> Result<()> {
        self.set(key, MetaValue::I64(value))
    }

    fn commit(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        match state.fail_commit_in {
            Some(0) => {
                state.fail_commit_in = None;
                return Err(MetadataError::CommitFailed.into());
            }
            Some(n) => state.fail_commit_in = Some(n - 1),
            None => {}
        }

        let PartitionState {
            staged, committed, ..
        } = &mut *state;
        for (key, value) in staged.iter().filter(|(key, _)| key.0 == self.namespace) {
            committed
                .insert(key.clone(), *value)
                .map_err(|_| MetadataError::StoreFull)?;
        }
        state.commit_count += 1;
        Ok(())
    }
}
