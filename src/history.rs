pub mod companion;
pub mod storage;

use derive_more::IntoIterator;

use crate::{
    error::Result,
    history::storage::{KeyValueStore, load_value, store_value},
    rules::record::RollRecord,
};

pub const HISTORY_KEY: &str = "rollHistory";
pub const DEFAULT_CAPACITY: usize = 50;

/// Newest-first sequence of records holding at most `capacity` entries.
#[derive(Debug, Clone, PartialEq, Eq, IntoIterator)]
pub struct RollLog {
    #[into_iterator(owned, ref)]
    records: Vec<RollRecord>,
    capacity: usize,
}

impl Default for RollLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RollLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Builds a log from records already ordered newest-first, keeping the
    /// newest `capacity` of them.
    pub fn from_records(mut records: Vec<RollRecord>, capacity: usize) -> Self {
        records.truncate(capacity);
        Self { records, capacity }
    }

    /// Inserts at the front and returns the records evicted from the tail,
    /// oldest last.
    pub fn push_front(&mut self, record: RollRecord) -> Vec<RollRecord> {
        self.records.insert(0, record);
        if self.records.len() > self.capacity {
            self.records.split_off(self.capacity)
        } else {
            Vec::new()
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[RollRecord] {
        &self.records
    }
}

/// The persisted roll history. Every mutation writes the full list back to
/// the store under [`HISTORY_KEY`].
#[derive(Debug)]
pub struct RollHistory<S> {
    log: RollLog,
    store: S,
}

impl<S: KeyValueStore> RollHistory<S> {
    /// Loads the history from `store`. Missing or undecodable data yields an
    /// empty history.
    pub fn load(store: S, capacity: usize) -> Self {
        let records: Vec<RollRecord> = load_value(&store, HISTORY_KEY).unwrap_or_default();
        if records.len() > capacity {
            log::debug!(
                "Persisted history has {} records, keeping the newest {capacity}",
                records.len()
            );
        }
        Self {
            log: RollLog::from_records(records, capacity),
            store,
        }
    }

    pub fn append(&mut self, record: RollRecord) -> Result<()> {
        let evicted = self.log.push_front(record);
        if !evicted.is_empty() {
            log::debug!("Evicted {} oldest roll(s) from history", evicted.len());
        }
        self.persist()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.log.clear();
        self.persist()
    }

    /// Newest-first snapshot of the history.
    pub fn all(&self) -> &[RollRecord] {
        self.log.as_slice()
    }

    pub fn log(&self) -> &RollLog {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) -> Result<()> {
        store_value(&mut self.store, HISTORY_KEY, self.log.as_slice())?;
        log::debug!("Persisted {} roll(s)", self.log.len());
        Ok(())
    }
}
