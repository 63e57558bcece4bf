//! Volcengine TOS through its S3-compatible endpoint
//!
//! TOS serves the S3 protocol on `tos-s3-{region}.volces.com`; a native
//! `tos-{region}` endpoint is rewritten to its S3 twin.

use crate::endpoint::with_scheme;
use crate::error::StorageResult;
use crate::s3_compat::{build_client, ClientSettings, S3CompatibleStorage, S3Flavor};
use cloudkit_core::{S3CredentialMode, Vendor, VolcengineTosConfig};

pub struct VolcengineTos;

impl S3Flavor for VolcengineTos {
    const VENDOR: Vendor = Vendor::VolcengineTos;
}

pub type VolcengineTosStorage = S3CompatibleStorage<VolcengineTos>;

impl S3CompatibleStorage<VolcengineTos> {
    pub async fn new(config: &VolcengineTosConfig) -> StorageResult<Self> {
        config.validate()?;

        let region = config.region.trim();
        let endpoint = s3_endpoint(region, &config.endpoint);
        let client = build_client(ClientSettings {
            region,
            endpoint: Some(&endpoint),
            path_style: false,
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
            "Volcengine TOS storage initialized"
        );

        Ok(Self::from_client(client, config.bucket.clone(), ""))
    }
}

fn s3_endpoint(region: &str, endpoint: &str) -> String {
    if endpoint.trim().is_empty() {
        return format!("https://tos-s3-{}.volces.com", region);
    }

    let url = with_scheme(endpoint);
    let Some((scheme, rest)) = url.split_once("://") else {
        return url;
    };
    match rest.strip_prefix("tos-") {
        Some(tail) if !tail.starts_with("s3-") => format!("{}://tos-s3-{}", scheme, tail),
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_derived_from_region() {
        assert_eq!(
            s3_endpoint("cn-beijing", ""),
            "https://tos-s3-cn-beijing.volces.com"
        );
    }

    #[test]
    fn test_native_endpoint_rewritten() {
        assert_eq!(
            s3_endpoint("cn-beijing", "tos-cn-beijing.volces.com"),
            "https://tos-s3-cn-beijing.volces.com"
        );
        assert_eq!(
            s3_endpoint("cn-beijing", "https://tos-cn-beijing.ivolces.com"),
            "https://tos-s3-cn-beijing.ivolces.com"
        );
    }

    #[test]
    fn test_s3_and_custom_endpoints_kept() {
        assert_eq!(
            s3_endpoint("cn-beijing", "https://tos-s3-cn-beijing.volces.com"),
            "https://tos-s3-cn-beijing.volces.com"
        );
        assert_eq!(
            s3_endpoint("cn-beijing", "http://gateway.internal:8080"),
            "http://gateway.internal:8080"
        );
    }

    #[tokio::test]
    async fn test_missing_region_is_rejected() {
        let cfg = VolcengineTosConfig {
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            bucket: "bucket".to_string(),
            ..VolcengineTosConfig::default()
        };
        let err = VolcengineTosStorage::new(&cfg).await.err().unwrap();
        assert!(err.is_argument_invalid());
    }
}
