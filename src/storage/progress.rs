use std::time::{SystemTime, UNIX_EPOCH};

use super::WindowStorage;
use crate::{
    encoding::{keycode, EncodingError, KeyBuilder},
    error::{Error, Result, ResultExt},
    model::DataType,
    store::Store,
};

/// A progress value with the time it was written.
///
/// Writes are last-write-wins; the timestamp is recorded but never compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMarker<T> {
    /// Write time, epoch milliseconds.
    pub timestamp: i64,
    pub value: T,
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

fn offset_key(shuffle_id: &str, window_configure_name: &str, ori_queue_id: &str) -> Vec<u8> {
    KeyBuilder::new(DataType::MaxOffset)
        .segment(shuffle_id)
        .segment(window_configure_name)
        .segment(ori_queue_id)
        .build()
}

fn partition_num_key(shuffle_id: &str, window_instance_id: &str) -> Vec<u8> {
    KeyBuilder::new(DataType::MaxPartitionNum)
        .segment(shuffle_id)
        .segment(window_instance_id)
        .build()
}

/// Marker value layout: `timestamp | payload`, two key-codec segments.
fn encode_marker(timestamp: i64, payload: &str) -> Vec<u8> {
    keycode::merge([timestamp.to_string().as_str(), payload])
}

fn decode_marker(bytes: &[u8]) -> Result<ProgressMarker<String>> {
    let mut segments = keycode::split(bytes)?;
    if segments.len() != 2 {
        return Err(EncodingError::InvalidFormat(format!(
            "Progress marker must have 2 segments, found {}",
            segments.len()
        ))
        .into());
    }

    let value = segments.pop().unwrap_or_default();
    let timestamp = segments[0]
        .parse::<i64>()
        .map_err(|e| EncodingError::InvalidFormat(format!("Invalid marker timestamp: {}", e)))?;

    Ok(ProgressMarker { timestamp, value })
}

impl<S: Store> WindowStorage<S> {
    fn read_marker(&self, key: &[u8], op: &'static str) -> Result<Option<ProgressMarker<String>>> {
        match self.store.get(key).op(op)? {
            Some(bytes) if !bytes.is_empty() => decode_marker(&bytes).map(Some).op(op),
            _ => Ok(None),
        }
    }

    /// Record the highest offset consumed from `ori_queue_id`.
    pub fn put_max_offset(
        &self,
        shuffle_id: &str,
        window_configure_name: &str,
        ori_queue_id: &str,
        offset: &str,
    ) -> Result<()> {
        let key = offset_key(shuffle_id, window_configure_name, ori_queue_id);
        let value = encode_marker(now_millis(), offset);
        self.store.put(&key, &value).op("put_max_offset")
    }

    /// Highest recorded offset, or `None` if nothing was recorded.
    pub fn get_max_offset(
        &self,
        shuffle_id: &str,
        window_configure_name: &str,
        ori_queue_id: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .get_max_offset_marker(shuffle_id, window_configure_name, ori_queue_id)?
            .map(|marker| marker.value))
    }

    pub fn get_max_offset_marker(
        &self,
        shuffle_id: &str,
        window_configure_name: &str,
        ori_queue_id: &str,
    ) -> Result<Option<ProgressMarker<String>>> {
        let key = offset_key(shuffle_id, window_configure_name, ori_queue_id);
        self.read_marker(&key, "get_max_offset")
    }

    pub fn delete_max_offset(
        &self,
        shuffle_id: &str,
        window_configure_name: &str,
        ori_queue_id: &str,
    ) -> Result<()> {
        let key = offset_key(shuffle_id, window_configure_name, ori_queue_id);
        self.store.delete(&key).op("delete_max_offset")
    }

    /// Record the highest output partition number seen for a window instance.
    pub fn put_max_partition_num(
        &self,
        shuffle_id: &str,
        window_instance_id: &str,
        max_partition_num: u64,
    ) -> Result<()> {
        let key = partition_num_key(shuffle_id, window_instance_id);
        let value = encode_marker(now_millis(), &max_partition_num.to_string());
        self.store.put(&key, &value).op("put_max_partition_num")
    }

    pub fn get_max_partition_num(
        &self,
        shuffle_id: &str,
        window_instance_id: &str,
    ) -> Result<Option<u64>> {
        Ok(self
            .get_max_partition_num_marker(shuffle_id, window_instance_id)?
            .map(|marker| marker.value))
    }

    pub fn get_max_partition_num_marker(
        &self,
        shuffle_id: &str,
        window_instance_id: &str,
    ) -> Result<Option<ProgressMarker<u64>>> {
        let key = partition_num_key(shuffle_id, window_instance_id);
        let Some(marker) = self.read_marker(&key, "get_max_partition_num")? else {
            return Ok(None);
        };

        let value = marker
            .value
            .parse::<u64>()
            .map_err(|e| {
                Error::from(EncodingError::InvalidFormat(format!(
                    "Invalid partition number: {}",
                    e
                )))
            })
            .op("get_max_partition_num")?;

        Ok(Some(ProgressMarker {
            timestamp: marker.timestamp,
            value,
        }))
    }

    pub fn delete_max_partition_num(&self, shuffle_id: &str, window_instance_id: &str) -> Result<()> {
        let key = partition_num_key(shuffle_id, window_instance_id);
        self.store.delete(&key).op("delete_max_partition_num")
    }
}
