use crate::error::{StorageError, StorageResult};
use crate::listing::{list_all, ListPage, PagedList};
use crate::traits::{ObjectPath, ObjectState, Storage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudkit_core::{LocalConfig, Vendor};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Objects are plain files under `base_path`; a key's `/` separators become
/// directories.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`, creating the
    /// directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::provider_init(e).with_detail(format!(
                "failed to create storage directory {}",
                base_path.display()
            ))
        })?;

        tracing::info!(path = %base_path.display(), "Local storage initialized");

        Ok(LocalStorage { base_path })
    }

    pub async fn from_config(config: &LocalConfig) -> StorageResult<Self> {
        config.validate()?;
        Self::new(&config.path).await
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a key to a filesystem path below `base_path`.
    ///
    /// Rejects keys that are empty, absolute, or contain empty, `.` or `..`
    /// segments. No key can resolve outside the storage directory, and every
    /// key is listed back exactly as it was saved.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }
        if key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "'{}' must be a relative '/'-separated path",
                key
            )));
        }
        if key.split('/').any(|segment| segment.is_empty()) {
            return Err(StorageError::InvalidKey(format!(
                "'{}' contains an empty path segment",
                key
            )));
        }
        if key.split('/').any(|segment| segment == ".." || segment == ".") {
            return Err(StorageError::InvalidKey(format!(
                "'{}' contains relative path segments",
                key
            )));
        }

        Ok(self.base_path.join(key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Key of a file found while walking the tree.
    fn path_to_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_path).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(segments.join("/"))
    }

    async fn file_metadata(&self, key: &str) -> StorageResult<std::fs::Metadata> {
        let path = self.key_to_path(key)?;
        let meta = fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a file", path.display()),
            )));
        }
        Ok(meta)
    }
}

#[async_trait]
impl PagedList for LocalStorage {
    /// The filesystem has no pagination: the whole subtree is one page.
    async fn list_page(&self, prefix: &str, _token: Option<String>) -> StorageResult<ListPage> {
        let root = match prefix.trim_end_matches('/') {
            "" => self.base_path.clone(),
            dir => self.key_to_path(dir)?,
        };

        let mut keys = Vec::new();
        let mut pending = Vec::new();

        // A prefix with nothing under it, or one naming a file, lists empty.
        match fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => pending.push(root),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    if let Some(key) = self.path_to_key(&path) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();

        Ok(ListPage {
            keys,
            truncated: false,
            next_token: None,
        })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn save(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage save successful"
        );

        Ok(())
    }

    async fn load(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        let data = fs::read(&path).await?;

        tracing::debug!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage load successful"
        );

        Ok(data)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn state(&self, key: &str) -> StorageResult<ObjectState> {
        let meta = self.file_metadata(key).await?;
        let last_modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();

        Ok(ObjectState {
            size: meta.len(),
            last_modified,
        })
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectPath>> {
        list_all(self, prefix).await
    }

    fn vendor(&self) -> Vendor {
        Vendor::Local
    }
}
