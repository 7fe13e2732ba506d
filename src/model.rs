//! Namespaces, window kinds and the state records persisted per window.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Namespace tag written as the first segment of every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    WindowInstance,
    WindowBaseValue,
    MaxOffset,
    MaxPartitionNum,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::WindowInstance,
        DataType::WindowBaseValue,
        DataType::MaxOffset,
        DataType::MaxPartitionNum,
    ];

    /// Stable tag string. Changing one orphans every key already on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::WindowInstance => "window_instance",
            DataType::WindowBaseValue => "window_base_value",
            DataType::MaxOffset => "max_offset",
            DataType::MaxPartitionNum => "max_partition_num",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowType {
    Normal,
    Session,
    Join,
}

impl WindowType {
    pub fn name(&self) -> &'static str {
        match self {
            WindowType::Normal => "NORMAL_WINDOW",
            WindowType::Session => "SESSION_WINDOW",
            WindowType::Join => "JOIN_WINDOW",
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL_WINDOW" => Ok(WindowType::Normal),
            "SESSION_WINDOW" => Ok(WindowType::Session),
            "JOIN_WINDOW" => Ok(WindowType::Join),
            other => Err(Error::UnsupportedWindowType(other.to_string())),
        }
    }
}

/// Side of a stream-stream join a state entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Left,
    Right,
}

impl JoinType {
    pub fn name(&self) -> &'static str {
        match self {
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JoinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEFT" => Ok(JoinType::Left),
            "RIGHT" => Ok(JoinType::Right),
            other => Err(Error::UnsupportedWindowType(format!("join type {}", other))),
        }
    }
}

/// One concrete, time-bounded occurrence of a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInstance {
    pub window_instance_id: String,
    pub window_namespace: String,
    pub window_configure_name: String,
    /// Window bounds and fire time, epoch milliseconds.
    pub start_time: i64,
    pub end_time: i64,
    pub fire_time: i64,
    /// Source queue the instance was opened from.
    pub split_id: String,
    pub is_new_window: bool,
}

/// Accumulator for one group key in a tumbling or sliding window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateState {
    pub msg_key: String,
    pub partition: String,
    pub partition_num: u64,
    pub update_version: u64,
    pub payload: Vec<u8>,
}

/// Accumulator for one group key in a session window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub msg_key: String,
    pub session_start: i64,
    pub session_end: i64,
    pub payload: Vec<u8>,
}

/// One buffered message on one side of a join window.
///
/// Both sides can share a group key, so entries are identified by
/// `message_id` rather than `msg_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinState {
    pub side: JoinType,
    pub message_id: String,
    pub msg_key: String,
    pub message_time: i64,
    pub payload: Vec<u8>,
}

/// Per-key state inside a window instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowBaseValue {
    Aggregate(AggregateState),
    Session(SessionState),
    Join(JoinState),
}

impl WindowBaseValue {
    /// The field that makes this value unique inside its window prefix.
    pub fn identity(&self) -> &str {
        match self {
            WindowBaseValue::Aggregate(state) => &state.msg_key,
            WindowBaseValue::Session(state) => &state.msg_key,
            WindowBaseValue::Join(state) => &state.message_id,
        }
    }

    /// Window kind this value is stored under.
    pub fn window_type(&self) -> WindowType {
        match self {
            WindowBaseValue::Aggregate(_) => WindowType::Normal,
            WindowBaseValue::Session(_) => WindowType::Session,
            WindowBaseValue::Join(_) => WindowType::Join,
        }
    }

    pub fn msg_key(&self) -> &str {
        match self {
            WindowBaseValue::Aggregate(state) => &state.msg_key,
            WindowBaseValue::Session(state) => &state.msg_key,
            WindowBaseValue::Join(state) => &state.msg_key,
        }
    }
}
