//! Window state persistence.
//!
//! [`WindowStorage`] is the entry point for window operators. It owns a shared
//! [`Store`] handle and groups its operations by the kind of entity stored:
//!
//! - window instances (`instance.rs`)
//! - per-key base values of a window instance (`base_value.rs`)
//! - progress markers: max consumed offset, max partition number (`progress.rs`)
//! - queue-wide sweeps and namespace access (`sweep.rs`)
//!
//! Every key starts with a [`DataType`](crate::model::DataType) tag, so the four
//! kinds never share a prefix even when their remaining segments are equal.
//!
//! # Consistency
//!
//! Calls are synchronous and add no locking on top of the store. Concurrent
//! writes to one key are last-write-wins, and multi-step operations (bulk
//! deletes, sweeps) are not atomic. A crash in the middle of one leaves the
//! prefix partially cleaned; running it again finishes the job.

mod base_value;
mod instance;
mod metrics;
mod progress;
mod sweep;

pub use metrics::NamespaceStats;
pub use progress::ProgressMarker;

use std::sync::Arc;

use crate::{
    config::StorageConfig,
    error::{Result, ResultExt},
    iterator::PrefixIter,
    store::{RocksStore, Store},
};

/// Window state store shared by all operators in a process.
#[derive(Debug)]
pub struct WindowStorage<S> {
    store: Arc<S>,
}

impl<S> Clone for WindowStorage<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl WindowStorage<RocksStore> {
    /// Open a RocksDB-backed storage in `config.dir`.
    pub fn open(config: StorageConfig) -> Result<Self> {
        let store = RocksStore::open_with_config(config).op("open")?;
        Ok(Self::new(store))
    }
}

impl<S: Store> WindowStorage<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Wrap a store handle that is already shared with other components.
    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Force buffered writes to disk.
    ///
    /// With [`Durability::Relaxed`](crate::config::Durability::Relaxed), call
    /// this before committing upstream offsets so the progress markers being
    /// relied on for replay are actually on disk.
    pub fn flush(&self) -> Result<()> {
        self.store.flush().op("flush")
    }

    /// Read a value stored under an already-encoded key.
    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.store.get(key).op("get_raw")
    }

    /// Write a value under an already-encoded key. Empty keys are ignored.
    pub fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        self.store.put(key, value).op("put_raw")
    }

    /// Delete an already-encoded key. Empty keys are ignored.
    pub fn delete_raw(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        self.store.delete(key).op("delete_raw")
    }

    pub(crate) fn scan<T>(&self, prefix: &[u8], op: &'static str) -> PrefixIter<S::ScanIterator<'_>, T> {
        PrefixIter::labelled(self.store.scan_prefix(prefix), op)
    }
}
