use super::WindowStorage;
use crate::{
    encoding::{KeyBuilder, Value},
    error::{Result, ResultExt},
    iterator::PrefixIter,
    model::{DataType, WindowInstance},
    store::Store,
};

fn instance_prefix(shuffle_id: &str, window_namespace: &str, window_configure_name: &str) -> KeyBuilder {
    KeyBuilder::new(DataType::WindowInstance)
        .segment(shuffle_id)
        .segment(window_namespace)
        .segment(window_configure_name)
}

impl<S: Store> WindowStorage<S> {
    /// Persist a window instance, replacing any instance with the same id.
    ///
    /// Instances without an id are ignored.
    pub fn put_window_instance(
        &self,
        shuffle_id: &str,
        window_namespace: &str,
        window_configure_name: &str,
        instance: &WindowInstance,
    ) -> Result<()> {
        if instance.window_instance_id.is_empty() {
            tracing::debug!(shuffle_id, window_namespace, "Skipping window instance without id");
            return Ok(());
        }

        let key = instance_prefix(shuffle_id, window_namespace, window_configure_name)
            .segment(&instance.window_instance_id)
            .build();
        let value = instance.encode().op("put_window_instance")?;

        self.store.put(&key, &value).op("put_window_instance")
    }

    /// Point lookup of one window instance.
    pub fn get_window_instance(
        &self,
        shuffle_id: &str,
        window_namespace: &str,
        window_configure_name: &str,
        window_instance_id: &str,
    ) -> Result<Option<WindowInstance>> {
        let key = instance_prefix(shuffle_id, window_namespace, window_configure_name)
            .segment(window_instance_id)
            .build();

        match self.store.get(&key).op("get_window_instance")? {
            Some(bytes) => Ok(Some(WindowInstance::decode(&bytes).op("get_window_instance")?)),
            None => Ok(None),
        }
    }

    /// Scan every instance of one window definition in a shuffle.
    pub fn get_window_instances(
        &self,
        shuffle_id: &str,
        window_namespace: &str,
        window_configure_name: &str,
    ) -> PrefixIter<S::ScanIterator<'_>, WindowInstance> {
        let prefix = instance_prefix(shuffle_id, window_namespace, window_configure_name);
        self.scan(prefix.as_bytes(), "get_window_instances")
    }

    /// Remove one window instance. Empty ids are ignored.
    pub fn delete_window_instance(
        &self,
        shuffle_id: &str,
        window_namespace: &str,
        window_configure_name: &str,
        window_instance_id: &str,
    ) -> Result<()> {
        if window_instance_id.is_empty() {
            return Ok(());
        }

        let key = instance_prefix(shuffle_id, window_namespace, window_configure_name)
            .segment(window_instance_id)
            .build();
        self.store.delete(&key).op("delete_window_instance")
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::instance;
    use super::*;
    use crate::store::MemoryStore;

    fn storage() -> WindowStorage<MemoryStore> {
        WindowStorage::new(MemoryStore::new())
    }

    fn scan_ids(storage: &WindowStorage<MemoryStore>, shuffle_id: &str) -> Result<Vec<String>> {
        storage
            .get_window_instances(shuffle_id, "ns", "agg")
            .values()
            .map(|instance| instance.map(|i| i.window_instance_id))
            .collect()
    }

    #[test]
    fn test_put_scan_delete() -> Result<()> {
        let storage = storage();
        storage.put_window_instance("s1", "ns", "agg", &instance("w1"))?;

        assert_eq!(scan_ids(&storage, "s1")?, vec!["w1".to_string()]);
        assert_eq!(
            storage.get_window_instance("s1", "ns", "agg", "w1")?,
            Some(instance("w1"))
        );

        storage.delete_window_instance("s1", "ns", "agg", "w1")?;
        assert!(scan_ids(&storage, "s1")?.is_empty());
        assert_eq!(storage.get_window_instance("s1", "ns", "agg", "w1")?, None);
        Ok(())
    }

    #[test]
    fn test_put_overwrites_same_identity() -> Result<()> {
        let storage = storage();
        storage.put_window_instance("s1", "ns", "agg", &instance("w1"))?;

        let mut updated = instance("w1");
        updated.fire_time = 9_999;
        updated.is_new_window = false;
        storage.put_window_instance("s1", "ns", "agg", &updated)?;

        let all: Vec<_> = storage
            .get_window_instances("s1", "ns", "agg")
            .values()
            .collect::<Result<_>>()?;
        assert_eq!(all, vec![updated]);
        Ok(())
    }

    #[test]
    fn test_empty_id_is_noop() -> Result<()> {
        let storage = storage();
        storage.put_window_instance("s1", "ns", "agg", &instance(""))?;
        assert!(storage.store().is_empty());

        storage.delete_window_instance("s1", "ns", "agg", "")?;
        Ok(())
    }

    #[test]
    fn test_scan_is_scoped_to_definition() -> Result<()> {
        let storage = storage();
        storage.put_window_instance("s1", "ns", "agg", &instance("w1"))?;
        storage.put_window_instance("s1", "ns", "agg", &instance("w2"))?;
        storage.put_window_instance("s1", "ns", "agg2", &instance("w3"))?;
        storage.put_window_instance("s10", "ns", "agg", &instance("w4"))?;

        assert_eq!(scan_ids(&storage, "s1")?, vec!["w1".to_string(), "w2".to_string()]);
        assert_eq!(scan_ids(&storage, "s10")?, vec!["w4".to_string()]);
        Ok(())
    }

    #[test]
    fn test_scan_entries_expose_keys() -> Result<()> {
        let storage = storage();
        storage.put_window_instance("s1", "ns", "agg", &instance("w1"))?;

        let entry = storage
            .get_window_instances("s1", "ns", "agg")
            .next()
            .expect("one entry")?;
        assert_eq!(
            entry.segments()?,
            vec!["window_instance", "s1", "ns", "agg", "w1"]
        );
        assert_eq!(entry.decode()?, instance("w1"));
        Ok(())
    }
}
