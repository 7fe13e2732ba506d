//! Windowed state persistence for streaming aggregations.
//!
//! Window operators keep four kinds of state in one embedded ordered
//! key-value store: window instances, per-key base values, the highest
//! consumed offset per source queue and the highest partition number per
//! window instance. Keys are built with an order-preserving segment codec
//! ([`encoding::keycode`]) whose first segment is a [`DataType`] tag, so each
//! kind lives in a disjoint key range and can be scanned by prefix.
//!
//! ```no_run
//! use window_state::{StorageConfig, WindowStorage, WindowType};
//!
//! # fn main() -> window_state::Result<()> {
//! let storage = WindowStorage::open(StorageConfig::new("/tmp/window-state"))?;
//! storage.put_max_offset("shuffle-1", "agg", "queue-0", "1024")?;
//!
//! for value in storage.get_window_base_value("shuffle-1", "w1", WindowType::Normal, None)?.values() {
//!     println!("{:?}", value?);
//! }
//!
//! // Partition released: drop everything it owned
//! storage.clear_cache("shuffle-1")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod iterator;
pub mod model;
pub mod storage;
pub mod store;

pub use config::{Durability, StorageConfig};
pub use error::{Error, Result};
pub use iterator::{PrefixIter, ScanEntry};
pub use model::{
    AggregateState, DataType, JoinState, JoinType, SessionState, WindowBaseValue, WindowInstance,
    WindowType,
};
pub use storage::{NamespaceStats, ProgressMarker, WindowStorage};
pub use store::{MemoryStore, RocksStore, Store};
