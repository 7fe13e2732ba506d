use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;

use super::{prefix_end, Store};
use crate::error::Result;

/// In-process ordered store backed by a `BTreeMap`.
///
/// Nothing is persisted. Scans copy the matching range out under the read
/// lock, so a scan never observes writes made after it started.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Store for MemoryStore {
    type ScanIterator<'a> = std::vec::IntoIter<Result<(Vec<u8>, Vec<u8>)>>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Self::ScanIterator<'a> {
        let start = Bound::Included(prefix.to_vec());
        let end = match prefix_end(prefix) {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };

        let entries: Vec<_> = self
            .data
            .read()
            .range((start, end))
            .map(|(key, value)| Ok((key.clone(), value.clone())))
            .collect();
        entries.into_iter()
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.put(b"key1", b"value1")?;
        assert_eq!(store.get(b"key1")?, Some(b"value1".to_vec()));

        store.put(b"key1", b"value2")?;
        assert_eq!(store.get(b"key1")?, Some(b"value2".to_vec()));
        assert_eq!(store.len(), 1);

        store.delete(b"key1")?;
        assert_eq!(store.get(b"key1")?, None);

        // Deleting twice is harmless
        store.delete(b"key1")?;
        Ok(())
    }

    #[test]
    fn test_scan_prefix_bounds() -> Result<()> {
        let store = MemoryStore::new();
        store.put(b"a", b"0")?;
        store.put(b"ab", b"1")?;
        store.put(b"abc", b"2")?;
        store.put(b"ac", b"3")?;
        store.put(&[b'a', b'b', 0xFF], b"4")?;

        let keys: Vec<Vec<u8>> = store
            .scan_prefix(b"ab")
            .map(|entry| entry.map(|(key, _)| key))
            .collect::<Result<_>>()?;

        assert_eq!(
            keys,
            vec![b"ab".to_vec(), b"abc".to_vec(), vec![b'a', b'b', 0xFF]]
        );
        Ok(())
    }

    #[test]
    fn test_scan_all_ff_prefix() -> Result<()> {
        let store = MemoryStore::new();
        store.put(&[0xFF], b"0")?;
        store.put(&[0xFF, 0x01], b"1")?;
        store.put(&[0xFE], b"2")?;

        assert_eq!(store.scan_prefix(&[0xFF]).count(), 2);
        assert_eq!(store.scan_prefix(&[]).count(), 3);
        Ok(())
    }
}
