use std::path::PathBuf;

use rocksdb::{DBIterator, Direction, IteratorMode, Options, ReadOptions, WriteOptions, DB};

use super::{prefix_end, Store};
use crate::{config::StorageConfig, error::Result};

/// RocksDB-backed store.
///
/// Writes use the durability policy from [`StorageConfig`]. With the default
/// [`Durability::Relaxed`](crate::config::Durability::Relaxed) policy the WAL
/// is off, so data only reaches disk when RocksDB flushes a memtable or
/// [`Store::flush`] is called.
pub struct RocksStore {
    db: DB,
    write_opts: WriteOptions,
    config: StorageConfig,
}

impl RocksStore {
    /// Open store with default configuration
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_config(StorageConfig::new(dir))
    }

    /// Open store with custom configuration
    pub fn open_with_config(config: StorageConfig) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_open_files(config.max_open_files);

        let db = DB::open(&opts, &config.dir)?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(config.durability.sync_writes());
        write_opts.disable_wal(!config.durability.wal_enabled());

        tracing::info!(
            dir = %config.dir.display(),
            durability = ?config.durability,
            "Opened window state store"
        );

        Ok(Self {
            db,
            write_opts,
            config,
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore")
            .field("config", &self.config)
            .finish()
    }
}

/// Forward iterator over the keys of one prefix.
pub struct RocksPrefixIter<'a> {
    inner: DBIterator<'a>,
    prefix: Vec<u8>,
    done: bool,
}

impl Iterator for RocksPrefixIter<'_> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.inner.next()? {
            Ok((key, value)) => {
                if !key.starts_with(&self.prefix) {
                    self.done = true;
                    return None;
                }
                Some(Ok((key.into_vec(), value.into_vec())))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

impl Store for RocksStore {
    type ScanIterator<'a> = RocksPrefixIter<'a>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        Ok(self.db.put_opt(key, value, &self.write_opts)?)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        Ok(self.db.delete_opt(key, &self.write_opts)?)
    }

    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Self::ScanIterator<'a> {
        let mut read_opts = ReadOptions::default();
        if let Some(end) = prefix_end(prefix) {
            read_opts.set_iterate_upper_bound(end);
        }

        let inner = self
            .db
            .iterator_opt(IteratorMode::From(prefix, Direction::Forward), read_opts);

        RocksPrefixIter {
            inner,
            prefix: prefix.to_vec(),
            done: false,
        }
    }

    fn flush(&self) -> Result<()> {
        Ok(self.db.flush()?)
    }
}
