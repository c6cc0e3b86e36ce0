//! Shared, load-once access to the record set.

use crate::{
    config::DatasetConfig,
    error::ChurnResult,
    loader,
    record::CustomerRecord,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Anything that can produce the full record set.
pub trait RecordSource: Send + Sync {
    fn load(&self) -> ChurnResult<Vec<CustomerRecord>>;
}

impl RecordSource for DatasetConfig {
    fn load(&self) -> ChurnResult<Vec<CustomerRecord>> {
        loader::load(self)
    }
}

/// Loads the record set on first use and hands out the same immutable
/// snapshot afterwards. A failed load is not cached; the next call retries.
pub struct DatasetProvider {
    source: Box<dyn RecordSource>,
    cached: Mutex<Option<Arc<[CustomerRecord]>>>,
}

impl DatasetProvider {
    pub fn new(source: impl RecordSource + 'static) -> Self {
        Self { source: Box::new(source), cached: Mutex::new(None) }
    }

    pub fn from_config(config: DatasetConfig) -> Self {
        Self::new(config)
    }

    /// The record set, loading it if this is the first successful call.
    /// Concurrent first calls load once: the lock is held across the load.
    pub fn records(&self) -> ChurnResult<Arc<[CustomerRecord]>> {
        let mut cached = self.lock_cache();
        if let Some(records) = cached.as_ref() {
            return Ok(Arc::clone(records));
        }
        let records: Arc<[CustomerRecord]> = self.source.load()?.into();
        log::info!("provider: cached {} records", records.len());
        *cached = Some(Arc::clone(&records));
        Ok(records)
    }

    pub fn is_loaded(&self) -> bool {
        self.lock_cache().is_some()
    }

    /// A source that panicked mid-load poisons the lock, but the slot is only
    /// written after a successful load, so the guard is still valid.
    fn lock_cache(&self) -> MutexGuard<'_, Option<Arc<[CustomerRecord]>>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
