//! CloudKit Core Library
//!
//! Vendor tags, the backend configuration model and its validation. Shared by
//! the storage crate and by callers that build configurations.

pub mod config;
pub mod connection_string;
pub mod error;
pub mod vendor;

// Re-export commonly used types
pub use config::{
    AliyunOssConfig, AzureBlobConfig, BackendConfig, GoogleCloudStorageConfig, HuaweiObsConfig,
    LocalConfig, S3Config, S3CredentialMode, TencentCosConfig, VolcengineTosConfig, VENDOR_ENV,
};
pub use connection_string::AzureConnectionString;
pub use error::ConfigError;
pub use vendor::Vendor;
