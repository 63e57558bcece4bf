//! Storage over an `object_store` client
//!
//! Azure Blob and Google Cloud Storage are reached through `object_store`.
//! The vendor modules build the concrete store; this module maps it onto the
//! `Storage` contract and feeds its paginated listing into the shared loop.

use crate::error::{StorageError, StorageResult};
use crate::listing::{list_all, ListPage, PagedList, PAGE_SIZE};
use crate::traits::{ObjectPath, ObjectState, Storage};
use async_trait::async_trait;
use cloudkit_core::Vendor;
use object_store::list::{PaginatedListOptions, PaginatedListStore};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload, Result as ObjectResult};

/// A concrete `object_store` client that backs one vendor.
pub trait VendorStore: ObjectStore + PaginatedListStore {
    const VENDOR: Vendor;
}

/// Map `key` onto an `object_store` location without rewriting it.
///
/// `Path` percent-encodes characters such as `#`, `%` and `[`, escapes `.`
/// segments and drops empty ones. Such a key would be stored under a different
/// name than the one `list` reports, so it is rejected instead.
pub(crate) fn location(key: &str) -> StorageResult<Path> {
    let path = Path::from(key);
    if key.is_empty() || path.as_ref() != key {
        return Err(StorageError::InvalidKey(format!(
            "'{}' cannot be stored verbatim",
            key
        )));
    }
    Ok(path)
}

/// Storage backed by an `object_store` client bound to one bucket or container.
pub struct ObjectStoreStorage<S> {
    store: S,
    /// Bucket or container name, for logs.
    scope: String,
}

impl<S: VendorStore> ObjectStoreStorage<S> {
    pub(crate) fn from_store(store: S, scope: impl Into<String>) -> Self {
        Self {
            store,
            scope: scope.into(),
        }
    }

    /// The underlying `object_store` client.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: VendorStore> PagedList for ObjectStoreStorage<S> {
    async fn list_page(&self, prefix: &str, token: Option<String>) -> StorageResult<ListPage> {
        let opts = PaginatedListOptions {
            max_keys: Some(PAGE_SIZE),
            page_token: token,
            ..Default::default()
        };
        let prefix_arg = (!prefix.is_empty()).then_some(prefix);

        let page = self
            .store
            .list_paginated(prefix_arg, opts)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    vendor = %S::VENDOR,
                    scope = %self.scope,
                    prefix = %prefix,
                    "List page failed"
                );
                StorageError::backend(e)
            })?;

        Ok(ListPage {
            keys: page
                .result
                .objects
                .into_iter()
                .map(|meta| meta.location.to_string())
                .collect(),
            truncated: page.page_token.is_some(),
            next_token: page.page_token,
        })
    }
}

#[async_trait]
impl<S: VendorStore> Storage for ObjectStoreStorage<S> {
    async fn save(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let location = location(key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                vendor = %S::VENDOR,
                scope = %self.scope,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Save failed"
            );
            StorageError::backend(e)
        })?;

        tracing::info!(
            vendor = %S::VENDOR,
            scope = %self.scope,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Save successful"
        );

        Ok(())
    }

    async fn load(&self, key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let location = location(key)?;

        let result: ObjectResult<_> = self.store.get(&location).await;
        let result = result.map_err(|e| {
            if !matches!(e, ObjectStoreError::NotFound { .. }) {
                tracing::error!(
                    error = %e,
                    vendor = %S::VENDOR,
                    scope = %self.scope,
                    key = %key,
                    "Load failed"
                );
            }
            StorageError::backend(e)
        })?;

        let bytes = result.bytes().await.map_err(StorageError::backend)?;

        tracing::debug!(
            vendor = %S::VENDOR,
            scope = %self.scope,
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Load successful"
        );

        Ok(bytes.to_vec())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = location(key)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::backend(e)),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = location(key)?;

        let result: ObjectResult<_> = self.store.delete(&location).await;
        match result {
            Ok(()) => {}
            // An absent object is fine, an absent bucket or container is not.
            // The store reports both as `NotFound`, so a listing tells them apart.
            Err(ObjectStoreError::NotFound { .. }) => {
                self.list_page(key, None).await?;
                return Ok(());
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    vendor = %S::VENDOR,
                    scope = %self.scope,
                    key = %key,
                    "Delete failed"
                );
                return Err(StorageError::backend(e));
            }
        }

        tracing::info!(
            vendor = %S::VENDOR,
            scope = %self.scope,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Delete successful"
        );

        Ok(())
    }

    async fn state(&self, key: &str) -> StorageResult<ObjectState> {
        let meta = self
            .store
            .head(&location(key)?)
            .await
            .map_err(StorageError::backend)?;

        Ok(ObjectState {
            size: meta.size,
            last_modified: meta.last_modified,
        })
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectPath>> {
        let dir = prefix.trim_end_matches('/');
        if !dir.is_empty() {
            location(dir)?;
        }
        list_all(self, prefix).await
    }

    fn vendor(&self) -> Vendor {
        S::VENDOR
    }
}
