//! Durable client-side cache.
//!
//! The browser original kept cart identity and checkout selections in
//! localStorage. This is the same idea rendered as a single JSON document on
//! disk: string keys, JSON values, survives restarts. It seeds the pre-sync
//! in-memory state and is never authoritative once a remote cart has loaded.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::{fs, io};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Cache keys used by the cart and checkout components.
pub mod keys {
    /// Identity of the active cart.
    pub const CART_ID: &str = "cart_id";
    /// Last-known cart contents.
    pub const CART: &str = "cart";
    /// Shipping address captured by the delivery step.
    pub const CHECKOUT_ADDRESS: &str = "checkout_address";
    /// Selected delivery method id.
    pub const CHECKOUT_DELIVERY: &str = "checkout_delivery";
}

const STORAGE_FILE: &str = "storage.json";

/// Errors that can occur writing the durable cache.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Value failed to encode.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A small durable key-value store backed by one JSON file.
///
/// Reads are forgiving: a missing file, missing key, or undecodable value
/// yields `None`, with corruption logged and healed by the next write.
/// Writes rewrite the whole document through a temp file and atomic rename,
/// so a crash never leaves a torn file behind.
pub struct DiskStore {
    path: PathBuf,
    /// In-memory mirror of the file; reads never touch the disk again.
    entries: Mutex<Map<String, Value>>,
}

impl DiskStore {
    /// Open the store rooted at `data_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created. An unreadable
    /// or corrupt storage file is not an error: it is logged and treated as
    /// empty.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;

        let path = data_dir.join(STORAGE_FILE);
        let entries = load_entries(&path);

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Read and decode the value under `key`.
    ///
    /// Missing and undecodable values both yield `None`.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.lock().get(key)?.clone();

        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache value for {key}: {e}");
                None
            }
        }
    }

    /// Store a value under `key`, rewriting the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the value fails to encode or the file cannot be
    /// written.
    pub fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_value(value)?;

        let mut entries = self.lock();
        entries.insert(key.to_owned(), encoded);
        self.persist(&entries)
    }

    /// Remove `key` if present, rewriting the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten. Removing an absent
    /// key is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> Map<String, Value> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Map::new(),
        Err(e) => {
            tracing::warn!("Failed to read cache file {}: {e}", path.display());
            return Map::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Corrupt cache file {}: {e}; starting empty", path.display());
            Map::new()
        }
    }
}
