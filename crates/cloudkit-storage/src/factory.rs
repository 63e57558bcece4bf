#[cfg(feature = "storage-s3")]
use crate::{AliyunOssStorage, HuaweiObsStorage, S3Storage, TencentCosStorage, VolcengineTosStorage};
#[cfg(feature = "storage-azure")]
use crate::AzureBlobStorage;
#[cfg(feature = "storage-gcs")]
use crate::GcsStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{Storage, StorageError, StorageResult};
use cloudkit_core::{BackendConfig, Vendor};
use std::sync::Arc;

/// Create the backend named by `vendor_tag` from `config`.
///
/// The tag must be one of the known vendor tags and `config` must carry that
/// vendor's parameters; both are checked, then the parameters are validated,
/// before any client is built. Every call returns a fresh handle.
pub async fn load(vendor_tag: &str, config: &BackendConfig) -> StorageResult<Arc<dyn Storage>> {
    let vendor: Vendor = vendor_tag.parse()?;

    if config.vendor() != vendor {
        return Err(StorageError::argument_invalid(format!(
            "can't find {} argument in config",
            vendor.config_field()
        )));
    }
    config.validate()?;

    let storage = build(config).await.map_err(|e| {
        tracing::error!(error = %e, vendor = %vendor, "Failed to create storage backend");
        e
    })?;

    tracing::debug!(vendor = %vendor, "Storage backend created");
    Ok(storage)
}

/// Create a storage backend for the vendor `config` belongs to.
pub async fn create_storage(config: &BackendConfig) -> StorageResult<Arc<dyn Storage>> {
    load(config.vendor().as_str(), config).await
}

/// Create the backend selected by `CLOUDKIT_STORAGE_VENDOR`, configured from
/// that vendor's environment variables.
pub async fn load_from_env() -> StorageResult<Arc<dyn Storage>> {
    let config = BackendConfig::load_env()?;
    create_storage(&config).await
}

async fn build(config: &BackendConfig) -> StorageResult<Arc<dyn Storage>> {
    match config {
        #[cfg(feature = "storage-local")]
        BackendConfig::Local(c) => Ok(Arc::new(LocalStorage::from_config(c).await?)),

        #[cfg(feature = "storage-s3")]
        BackendConfig::S3(c) => Ok(Arc::new(S3Storage::new(c).await?)),
        #[cfg(feature = "storage-s3")]
        BackendConfig::AliyunOss(c) => Ok(Arc::new(AliyunOssStorage::new(c).await?)),
        #[cfg(feature = "storage-s3")]
        BackendConfig::TencentCos(c) => Ok(Arc::new(TencentCosStorage::new(c).await?)),
        #[cfg(feature = "storage-s3")]
        BackendConfig::HuaweiObs(c) => Ok(Arc::new(HuaweiObsStorage::new(c).await?)),
        #[cfg(feature = "storage-s3")]
        BackendConfig::VolcengineTos(c) => Ok(Arc::new(VolcengineTosStorage::new(c).await?)),

        #[cfg(feature = "storage-azure")]
        BackendConfig::AzureBlob(c) => Ok(Arc::new(AzureBlobStorage::new(c)?)),

        #[cfg(feature = "storage-gcs")]
        BackendConfig::GoogleCloudStorage(c) => Ok(Arc::new(GcsStorage::new(c)?)),

        #[allow(unreachable_patterns)]
        other => Err(StorageError::argument_invalid(format!(
            "{} storage backend not available (feature not enabled)",
            other.vendor()
        ))),
    }
}
