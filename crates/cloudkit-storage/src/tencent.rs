//! Tencent COS through its S3-compatible endpoint

use crate::error::StorageResult;
use crate::s3_compat::{build_client, ClientSettings, S3CompatibleStorage, S3Flavor};
use cloudkit_core::{S3CredentialMode, TencentCosConfig, Vendor};

pub struct TencentCos;

impl S3Flavor for TencentCos {
    const VENDOR: Vendor = Vendor::TencentCos;
}

/// Bucket names carry the account suffix, e.g. `examplebucket-1250000000`.
pub type TencentCosStorage = S3CompatibleStorage<TencentCos>;

impl S3CompatibleStorage<TencentCos> {
    pub async fn new(config: &TencentCosConfig) -> StorageResult<Self> {
        config.validate()?;

        let region = config.region.trim();
        let endpoint = endpoint(region);
        let client = build_client(ClientSettings {
            region,
            endpoint: Some(&endpoint),
            path_style: false,
            credentials: S3CredentialMode::Static,
            access_key: &config.secret_id,
            secret_key: &config.secret_key,
            relaxed_checksums: true,
        })
        .await;

        tracing::info!(
            bucket = %config.bucket,
            endpoint = %endpoint,
            "Tencent COS storage initialized"
        );

        Ok(Self::from_client(client, config.bucket.clone(), ""))
    }
}

fn endpoint(region: &str) -> String {
    format!("https://cos.{}.myqcloud.com", region)
}
