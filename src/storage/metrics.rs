use super::WindowStorage;
use crate::{error::Result, model::DataType, store::Store};

/// Entry and byte counts of one queue, per namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceStats {
    pub window_instances: usize,
    pub window_base_values: usize,
    pub max_offsets: usize,
    pub max_partition_nums: usize,
    /// Key plus value bytes over all namespaces.
    pub total_bytes: usize,
}

impl NamespaceStats {
    pub fn count(&self, data_type: DataType) -> usize {
        match data_type {
            DataType::WindowInstance => self.window_instances,
            DataType::WindowBaseValue => self.window_base_values,
            DataType::MaxOffset => self.max_offsets,
            DataType::MaxPartitionNum => self.max_partition_nums,
        }
    }

    pub fn total_entries(&self) -> usize {
        DataType::ALL.iter().map(|data_type| self.count(*data_type)).sum()
    }

    fn slot(&mut self, data_type: DataType) -> &mut usize {
        match data_type {
            DataType::WindowInstance => &mut self.window_instances,
            DataType::WindowBaseValue => &mut self.window_base_values,
            DataType::MaxOffset => &mut self.max_offsets,
            DataType::MaxPartitionNum => &mut self.max_partition_nums,
        }
    }
}

impl<S: Store> WindowStorage<S> {
    /// Count what `queue_id` holds in each namespace and log it.
    pub fn collect_metrics(&self, queue_id: &str) -> Result<NamespaceStats> {
        let mut stats = NamespaceStats::default();

        for data_type in DataType::ALL {
            for entry in self.scan_namespace::<()>(queue_id, data_type) {
                let entry = entry?;
                *stats.slot(data_type) += 1;
                stats.total_bytes += entry.key().len() + entry.raw_value().len();
            }
        }

        tracing::info!(
            queue_id,
            window_instances = stats.window_instances,
            window_base_values = stats.window_base_values,
            max_offsets = stats.max_offsets,
            max_partition_nums = stats.max_partition_nums,
            total_bytes = stats.total_bytes,
            "Window state metrics"
        );

        Ok(stats)
    }
}
