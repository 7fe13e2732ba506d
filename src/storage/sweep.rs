use super::WindowStorage;
use crate::{
    encoding::KeyBuilder,
    error::{Result, ResultExt},
    iterator::PrefixIter,
    model::DataType,
    store::Store,
};

impl<S: Store> WindowStorage<S> {
    /// Delete every entry owned by `queue_id`, across all namespaces.
    ///
    /// Called when a partition is released so no state is left behind for
    /// the next owner. Keys are deleted as the scan returns them. Not atomic:
    /// after a failure, call again to finish; already deleted keys are simply
    /// not found. Returns the number of keys deleted.
    pub fn clear_cache(&self, queue_id: &str) -> Result<usize> {
        let mut deleted = 0;

        for data_type in DataType::ALL {
            let prefix = KeyBuilder::new(data_type).segment(queue_id);
            let mut count = 0;

            for key in self.scan::<()>(prefix.as_bytes(), "clear_cache").keys() {
                self.store.delete(&key?).op("clear_cache")?;
                count += 1;
            }

            if count > 0 {
                tracing::debug!(queue_id, namespace = %data_type, count, "Cleared namespace");
            }
            deleted += count;
        }

        tracing::debug!(queue_id, deleted, "Cleared queue state");
        Ok(deleted)
    }

    /// Scan one namespace of one queue.
    pub fn scan_namespace<T>(
        &self,
        queue_id: &str,
        data_type: DataType,
    ) -> PrefixIter<S::ScanIterator<'_>, T> {
        let prefix = KeyBuilder::new(data_type).segment(queue_id);
        self.scan(prefix.as_bytes(), "scan_namespace")
    }
}
