use std::path::PathBuf;

/// Write durability for the embedded store.
///
/// Window state can be rebuilt by replaying the source queue from the last
/// committed progress marker, so the default trades durability for write
/// throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// No write-ahead log, no fsync. Unflushed writes are lost on crash.
    #[default]
    Relaxed,
    /// Write-ahead log enabled, synced by the OS in the background.
    Wal,
    /// Write-ahead log enabled and fsynced on every write.
    Sync,
}

impl Durability {
    pub fn wal_enabled(&self) -> bool {
        !matches!(self, Durability::Relaxed)
    }

    pub fn sync_writes(&self) -> bool {
        matches!(self, Durability::Sync)
    }
}

/// Configuration for the window state store
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory path for the database
    pub dir: PathBuf,

    /// Write durability policy (default: Relaxed)
    pub durability: Durability,

    /// Create the database if it does not exist (default: true)
    pub create_if_missing: bool,

    /// Memtable size before RocksDB flushes it to disk (default: 64MB)
    pub write_buffer_size: usize,

    /// Maximum number of open files, -1 for unlimited (default: -1)
    pub max_open_files: i32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./window-state"),
            durability: Durability::default(),
            create_if_missing: true,
            write_buffer_size: 64 * 1024 * 1024, // 64MB
            max_open_files: -1,
        }
    }
}

impl StorageConfig {
    /// Create a new config with the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }

    /// Set the write durability policy
    pub fn durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set memtable size
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }

    pub fn max_open_files(mut self, max: i32) -> Self {
        self.max_open_files = max;
        self
    }
}
