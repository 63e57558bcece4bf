//! Google Cloud Storage

use crate::error::{StorageError, StorageResult};
use crate::object_store_backend::{ObjectStoreStorage, VendorStore};
use cloudkit_core::{GoogleCloudStorageConfig, Vendor};
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};

impl VendorStore for GoogleCloudStorage {
    const VENDOR: Vendor = Vendor::GoogleCloudStorage;
}

pub type GcsStorage = ObjectStoreStorage<GoogleCloudStorage>;

impl ObjectStoreStorage<GoogleCloudStorage> {
    /// Build a bucket client from the base64 service account key. No request is sent.
    pub fn new(config: &GoogleCloudStorageConfig) -> StorageResult<Self> {
        config.validate()?;
        let service_account = config.credentials_json()?;

        let store = GoogleCloudStorageBuilder::new()
            .with_bucket_name(&config.bucket)
            .with_service_account_key(service_account)
            .build()
            .map_err(|e| StorageError::provider_init(e).with_detail("failed to create GCS store"))?;

        tracing::info!(bucket = %config.bucket, "Google Cloud Storage initialized");

        Ok(Self::from_store(store, config.bucket.clone()))
    }
}
