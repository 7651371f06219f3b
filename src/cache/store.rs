//! Durable storage for the uniqueness cache.
//!
//! The cache persists as a single JSON file. A missing file is a cold start,
//! not an error: it loads as an empty cache. Saves overwrite the store with
//! the full current snapshot using the write-to-temp-then-rename pattern, so
//! readers (the next run, after a crash mid-save) always see either the old
//! or the new store, never a partial write.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entry::UsedCache;

/// Current store schema version. Increment on breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from cache store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema version mismatch.
    #[error("cache schema mismatch: expected {expected}, got {got}")]
    SchemaMismatch { expected: u32, got: u32 },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// The on-disk shape of the store.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCache {
    /// Schema version for forward-compatible migrations.
    schema_version: u32,

    /// The full cache contents.
    cache: UsedCache,
}

/// Loads the cache from `path`.
///
/// A missing file is a cold start and returns an empty cache. A present but
/// unreadable or mismatched file is an error.
pub fn load_cache(path: &Path) -> Result<UsedCache> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(UsedCache::new()),
        Err(e) => return Err(e.into()),
    };

    let persisted: PersistedCache = serde_json::from_slice(&bytes)?;
    if persisted.schema_version != SCHEMA_VERSION {
        return Err(StoreError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            got: persisted.schema_version,
        });
    }
    Ok(persisted.cache)
}

/// Saves the full cache snapshot to `path` atomically.
///
/// Writes to `<path>.tmp`, fsyncs, then renames over `path`.
pub fn save_cache(path: &Path, cache: &UsedCache) -> Result<()> {
    let persisted = PersistedCache {
        schema_version: SCHEMA_VERSION,
        cache: cache.clone(),
    };
    let json = serde_json::to_vec_pretty(&persisted)?;

    let tmp_path = path.with_extension("json.tmp");
    let mut file = File::create(&tmp_path)?;
    file.write_all(&json)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
