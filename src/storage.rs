use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use sled::{Db, Tree};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Corrupt history key: {0}")]
    CorruptHistoryKey(String),
}

/// The key-value store the ledger runs against.
///
/// `put` replaces the current value under a key and appends it to that key's
/// append-only history. The history cursor yields every version ever written,
/// oldest first, in the store's native order; a never-written key yields an
/// empty cursor. Dropping the cursor releases the underlying resource.
pub trait Store: Send + Sync {
    type History: Iterator<Item = Result<Vec<u8>, StoreError>>;

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn history(&self, key: &str) -> Result<Self::History, StoreError>;
}

pub struct SledStore {
    _db: Db,
    assets_tree: Tree,
    history_tree: Tree,
}

impl SledStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_db(sled::open(path)?)
    }

    /// An ephemeral store backed by a temporary database. Used by tests.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        Ok(Self {
            assets_tree: db.open_tree("assets")?,
            history_tree: db.open_tree("history")?,
            _db: db,
        })
    }

    // History entries live under `<hex(key)>:<seq:020>`. Hex keeps the
    // prefix unambiguous for arbitrary keys, zero-padding keeps the
    // lexicographic tree order equal to write order.
    fn history_prefix(key: &str) -> String {
        format!("{}:", hex::encode(key))
    }

    fn next_seq(&self, prefix: &str) -> Result<u64, StoreError> {
        let mut iter = self.history_tree.scan_prefix(prefix).rev();
        if let Some(entry) = iter.next() {
            let (key, _value) = entry?;
            let seq: u64 = key
                .get(prefix.len()..)
                .and_then(|suffix| std::str::from_utf8(suffix).ok())
                .and_then(|suffix| suffix.parse().ok())
                .ok_or_else(|| {
                    StoreError::CorruptHistoryKey(String::from_utf8_lossy(&key).into_owned())
                })?;
            Ok(seq + 1)
        } else {
            Ok(0)
        }
    }
}

impl Store for SledStore {
    type History = SledHistory;

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let prefix = Self::history_prefix(key);
        let seq = self.next_seq(&prefix)?;
        self.history_tree
            .insert(format!("{}{:0>20}", prefix, seq), value)?;
        self.assets_tree.insert(key, value)?;
        tracing::debug!(key, seq, "stored record version");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.assets_tree.get(key)?.map(|v| v.to_vec()))
    }

    fn history(&self, key: &str) -> Result<SledHistory, StoreError> {
        let iter = self.history_tree.scan_prefix(Self::history_prefix(key));
        Ok(SledHistory(iter))
    }
}

/// Cursor over the stored versions of one key, oldest first. Dropping it
/// releases the underlying tree iterator.
pub struct SledHistory(sled::Iter);

impl Iterator for SledHistory {
    type Item = Result<Vec<u8>, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|entry| {
            let (_key, value) = entry?;
            Ok(value.to_vec())
        })
    }
}

/// In-process store keeping current values and version history in maps.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    assets: HashMap<String, Vec<u8>>,
    history: HashMap<String, Vec<Vec<u8>>>,
}

impl Store for MemoryStore {
    type History = std::vec::IntoIter<Result<Vec<u8>, StoreError>>;

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .history
            .entry(key.to_string())
            .or_default()
            .push(value.to_vec());
        inner.assets.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().unwrap().assets.get(key).cloned())
    }

    fn history(&self, key: &str) -> Result<Self::History, StoreError> {
        let versions: Vec<Result<Vec<u8>, StoreError>> = self
            .inner
            .lock()
            .unwrap()
            .history
            .get(key)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(Ok)
            .collect();
        Ok(versions.into_iter())
    }
}
