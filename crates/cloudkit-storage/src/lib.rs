//! CloudKit Storage Library
//!
//! One storage contract, the `Storage` trait, implemented for the local
//! filesystem, AWS S3, Azure Blob, Aliyun OSS, Tencent COS, Google Cloud
//! Storage, Huawei OBS and Volcengine TOS. Use `factory::load` (or
//! `create_storage`) to turn a vendor tag and a `BackendConfig` into a
//! ready handle.
//!
//! # Keys and listing
//!
//! Keys are `/`-separated strings scoped to the handle's bucket, container or
//! root directory. `list(prefix)` treats the prefix as a directory and walks
//! every listing page, returning entries relative to the prefix; all backends
//! share that loop (see `listing`).

#[cfg(any(feature = "storage-s3", feature = "storage-azure"))]
mod endpoint;
pub mod error;
pub mod factory;
pub mod listing;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

#[cfg(feature = "storage-s3")]
pub mod aliyun;
#[cfg(feature = "storage-s3")]
pub mod huawei;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(feature = "storage-s3")]
pub mod s3_compat;
#[cfg(feature = "storage-s3")]
pub mod tencent;
#[cfg(feature = "storage-s3")]
pub mod volcengine;

#[cfg(feature = "storage-azure")]
pub mod azure;
#[cfg(feature = "storage-gcs")]
pub mod gcs;
#[cfg(any(feature = "storage-azure", feature = "storage-gcs"))]
pub mod object_store_backend;

// Re-export commonly used types
pub use cloudkit_core::{BackendConfig, Vendor};
pub use error::{BoxError, StorageError, StorageResult};
pub use factory::{create_storage, load, load_from_env};
pub use listing::MissingContinuationToken;
pub use traits::{ObjectPath, ObjectState, Storage};

#[cfg(feature = "storage-local")]
pub use local::LocalStorage;

#[cfg(feature = "storage-s3")]
pub use aliyun::AliyunOssStorage;
#[cfg(feature = "storage-s3")]
pub use huawei::HuaweiObsStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
#[cfg(feature = "storage-s3")]
pub use s3_compat::{S3CompatibleStorage, S3Flavor};
#[cfg(feature = "storage-s3")]
pub use tencent::TencentCosStorage;
#[cfg(feature = "storage-s3")]
pub use volcengine::VolcengineTosStorage;

#[cfg(feature = "storage-azure")]
pub use azure::AzureBlobStorage;
#[cfg(feature = "storage-gcs")]
pub use gcs::GcsStorage;
#[cfg(any(feature = "storage-azure", feature = "storage-gcs"))]
pub use object_store_backend::{ObjectStoreStorage, VendorStore};
