//! Embedded ordered key-value store handle.
//!
//! Window state is written through [`Store`], which exposes the small surface
//! the state layer needs: point get/put/delete, prefix-bounded forward scans
//! and an explicit flush. The handle is shared by every caller in the process
//! and must synchronize internally.

pub mod memory;
pub mod rocks;

pub use memory::MemoryStore;
pub use rocks::RocksStore;

use crate::error::Result;

pub trait Store: Send + Sync {
    /// The iterator returned by scan_prefix().
    type ScanIterator<'a>: ScanIterator + 'a
    where
        Self: 'a;

    /// Retrieves the value for a given key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Inserts or updates a key-value pair.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Iterates over all key-value pairs starting with the given prefix, in
    /// key order.
    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Self::ScanIterator<'a>;

    /// Persists buffered writes. Writes made without a write-ahead log are
    /// not guaranteed to survive a crash until this returns.
    fn flush(&self) -> Result<()>;
}

pub trait ScanIterator: Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> {}

impl<I> ScanIterator for I where I: Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> {}

/// Smallest key greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty prefix or all `0xFF`), in
/// which case the scan is unbounded above.
pub(crate) fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let i = prefix.iter().rposition(|b| *b != 0xff)?;
    let mut end = prefix[..=i].to_vec();
    end[i] += 1;
    Some(end)
}
