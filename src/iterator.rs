//! Typed prefix scans.
//!
//! A [`PrefixIter`] walks one key prefix of a [`Store`](crate::store::Store)
//! in key order and yields [`ScanEntry`] values. Entries carry the raw key and
//! value bytes; the value is only deserialized when [`ScanEntry::decode`] is
//! called. The iterator is forward-only and cannot be restarted. It sees
//! whatever the backend returns for keys written or removed while it is
//! running; no isolation is added here.

use std::marker::PhantomData;

use crate::encoding::{keycode, Value};
use crate::error::{Result, ResultExt};
use crate::store::ScanIterator;

/// One (key, value) pair read by a prefix scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry<T> {
    key: Vec<u8>,
    value: Vec<u8>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ScanEntry<T> {
    pub fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            key,
            value,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn raw_value(&self) -> &[u8] {
        &self.value
    }

    /// The key split back into its segments, namespace tag first.
    pub fn segments(&self) -> Result<Vec<String>> {
        keycode::split(&self.key)
    }
}

impl<T: Value> ScanEntry<T> {
    pub fn decode(&self) -> Result<T> {
        T::decode(&self.value)
    }
}

/// Lazily decoded scan over one key prefix.
pub struct PrefixIter<I, T> {
    inner: I,
    op: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<I: ScanIterator, T> PrefixIter<I, T> {
    pub fn new(inner: I) -> Self {
        Self::labelled(inner, "scan_prefix")
    }

    /// Store failures raised while scanning are reported under `op`.
    pub fn labelled(inner: I, op: &'static str) -> Self {
        Self {
            inner,
            op,
            _marker: PhantomData,
        }
    }

    /// Decode every entry, yielding only the values.
    pub fn values(self) -> Values<I, T>
    where
        T: Value,
    {
        Values { inner: self }
    }

    /// Yield only the raw keys.
    pub fn keys(self) -> impl Iterator<Item = Result<Vec<u8>>> {
        self.map(|entry| entry.map(|entry| entry.key))
    }
}

impl<I: ScanIterator, T> Iterator for PrefixIter<I, T> {
    type Item = Result<ScanEntry<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.next()?.op(self.op);
        Some(next.map(|(key, value)| ScanEntry::new(key, value)))
    }
}

/// Adapter returned by [`PrefixIter::values`].
pub struct Values<I, T> {
    inner: PrefixIter<I, T>,
}

impl<I: ScanIterator, T: Value> Iterator for Values<I, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(entry.and_then(|entry| entry.decode()).op(self.inner.op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::KeyBuilder;
    use crate::error::Error;
    use crate::model::DataType;
    use crate::store::{MemoryStore, Store};

    fn populate(store: &MemoryStore) -> Result<()> {
        for (ns, id, value) in [("ns1", "a", 1u64), ("ns1", "b", 2), ("ns2", "c", 3)] {
            let key = KeyBuilder::new(DataType::WindowInstance)
                .segment(ns)
                .segment(id)
                .build();
            store.put(&key, &value.encode()?)?;
        }
        Ok(())
    }

    #[test]
    fn test_entries_expose_key_and_decode_lazily() -> Result<()> {
        let store = MemoryStore::new();
        populate(&store)?;

        let prefix = KeyBuilder::new(DataType::WindowInstance).segment("ns1");
        let entries: Vec<ScanEntry<u64>> =
            PrefixIter::new(store.scan_prefix(prefix.as_bytes())).collect::<Result<_>>()?;

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].segments()?,
            vec!["window_instance".to_string(), "ns1".to_string(), "a".to_string()]
        );
        assert_eq!(entries[0].decode()?, 1);
        assert_eq!(entries[1].decode()?, 2);
        Ok(())
    }

    #[test]
    fn test_values_adapter() -> Result<()> {
        let store = MemoryStore::new();
        populate(&store)?;

        let prefix = KeyBuilder::new(DataType::WindowInstance);
        let values: Vec<u64> = PrefixIter::<_, u64>::new(store.scan_prefix(prefix.as_bytes()))
            .values()
            .collect::<Result<_>>()?;
        assert_eq!(values, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_decode_failure_is_per_entry() -> Result<()> {
        let store = MemoryStore::new();
        let prefix = KeyBuilder::new(DataType::WindowInstance).segment("ns");
        store.put(&prefix.clone().segment("good").build(), &7u64.encode()?)?;
        store.put(&prefix.clone().segment("short").build(), &[0x01])?;

        let mut values =
            PrefixIter::<_, u64>::labelled(store.scan_prefix(prefix.as_bytes()), "get_window_instances")
                .values();
        assert_eq!(values.next().transpose()?, Some(7));

        // Decode failures carry the scan's label, like store failures
        match values.next().unwrap() {
            Err(Error::Operation { op, source }) => {
                assert_eq!(op, "get_window_instances");
                assert!(matches!(*source, Error::Encoding(_)));
            }
            other => panic!("Expected labelled decode error, got {:?}", other),
        }
        assert!(values.next().is_none());
        Ok(())
    }
}
