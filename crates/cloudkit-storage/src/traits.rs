//! Storage abstraction trait
//!
//! This module defines the Storage trait that every backend implements, plus
//! the value types its operations return.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudkit_core::Vendor;

use crate::error::StorageResult;

/// One listing entry, relative to the listed prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    pub path: String,
    /// Always `false`: hierarchical backends are listed flat.
    pub is_dir: bool,
}

impl ObjectPath {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }
}

/// Metadata snapshot of an object, read at query time.
///
/// Backends that omit a value report the zero value (`0`, Unix epoch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectState {
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// All backends (local filesystem, S3 and the S3-compatible vendors, Azure
/// Blob, Google Cloud Storage) implement this trait with identical semantics,
/// so callers never need to know which one is active.
///
/// Keys are opaque, case-sensitive, `/`-separated strings scoped to the
/// handle's bucket, container or root directory.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn save(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Full object content. A missing key fails with the backend's own not-found error.
    async fn load(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// `Ok(false)` when the object is absent; `Err` only when existence
    /// could not be determined (auth, network, I/O).
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Remove the object. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Size and last-modified time. Fails like `load` when absent.
    async fn state(&self, key: &str) -> StorageResult<ObjectState>;

    /// Every object stored under `prefix`, across all listing pages.
    ///
    /// `prefix` is treated as a directory: `"p"` and `"p/"` list the same
    /// keys, and entries are returned relative to it. The marker object equal
    /// to the prefix itself is never returned. Order is the backend's.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectPath>>;

    /// Vendor tag of this handle, for diagnostics.
    fn vendor(&self) -> Vendor;
}
