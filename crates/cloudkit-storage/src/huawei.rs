//! Huawei OBS through its S3-compatible endpoint
//!
//! `server` is the OBS endpoint, e.g. `https://obs.cn-north-4.myhuaweicloud.com`.
//! The signing region is read from it.

use crate::endpoint::{host_of, with_scheme};
use crate::error::StorageResult;
use crate::s3_compat::{build_client, ClientSettings, S3CompatibleStorage, S3Flavor};
use cloudkit_core::{HuaweiObsConfig, S3CredentialMode, Vendor};

const FALLBACK_REGION: &str = "us-east-1";

pub struct HuaweiObs;

impl S3Flavor for HuaweiObs {
    const VENDOR: Vendor = Vendor::HuaweiObs;
}

pub type HuaweiObsStorage = S3CompatibleStorage<HuaweiObs>;

impl S3CompatibleStorage<HuaweiObs> {
    pub async fn new(config: &HuaweiObsConfig) -> StorageResult<Self> {
        config.validate()?;

        let endpoint = with_scheme(&config.server);
        let region = region_from_server(&endpoint);
        let client = build_client(ClientSettings {
            region,
            endpoint: Some(&endpoint),
            path_style: config.path_style,
            credentials: S3CredentialMode::Static,
            access_key: &config.access_key,
            secret_key: &config.secret_key,
            relaxed_checksums: true,
        })
        .await;

        tracing::info!(
            bucket = %config.bucket,
            endpoint = %endpoint,
            region = %region,
            path_style = config.path_style,
            "Huawei OBS storage initialized"
        );

        Ok(Self::from_client(client, config.bucket.clone(), ""))
    }
}

/// `obs.{region}.myhuaweicloud.com`, otherwise the fallback region.
fn region_from_server(server: &str) -> &str {
    host_of(server)
        .strip_prefix("obs.")
        .and_then(|rest| rest.strip_suffix(".myhuaweicloud.com"))
        .filter(|region| !region.is_empty() && !region.contains('.'))
        .unwrap_or(FALLBACK_REGION)
}
