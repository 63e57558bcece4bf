//! Aliyun OSS through its S3-compatible endpoint
//!
//! The region endpoint is `oss-{region}.aliyuncs.com`, a cloud box lives at
//! `{cloud_box_id}.{region}.oss-cloudbox.aliyuncs.com`. An explicit endpoint
//! wins over the derived region endpoint. `path` becomes the key root.

use crate::endpoint::{host_of, with_scheme};
use crate::error::StorageResult;
use crate::s3_compat::{build_client, ClientSettings, S3CompatibleStorage, S3Flavor};
use cloudkit_core::{AliyunOssConfig, S3CredentialMode, Vendor};

/// Signing region used when a V1 config gives only an endpoint we cannot parse.
const FALLBACK_REGION: &str = "cn-hangzhou";

pub struct AliyunOss;

impl S3Flavor for AliyunOss {
    const VENDOR: Vendor = Vendor::AliyunOss;
}

pub type AliyunOssStorage = S3CompatibleStorage<AliyunOss>;

impl S3CompatibleStorage<AliyunOss> {
    pub async fn new(config: &AliyunOssConfig) -> StorageResult<Self> {
        config.validate()?;

        let endpoint = endpoint(config);
        let region = signing_region(config);
        let client = build_client(ClientSettings {
            region: &region,
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
            root = %config.path,
            cloud_box = !config.cloud_box_id.trim().is_empty(),
            "Aliyun OSS storage initialized"
        );

        Ok(Self::from_client(client, config.bucket.clone(), &config.path))
    }
}

fn endpoint(config: &AliyunOssConfig) -> String {
    let region = bare_region(&config.region);
    let cloud_box = config.cloud_box_id.trim();
    if !cloud_box.is_empty() {
        return format!("https://{}.{}.oss-cloudbox.aliyuncs.com", cloud_box, region);
    }
    if !config.endpoint.trim().is_empty() {
        return with_scheme(&config.endpoint);
    }
    format!("https://oss-{}.aliyuncs.com", region)
}

fn signing_region(config: &AliyunOssConfig) -> String {
    let region = bare_region(&config.region);
    if !region.is_empty() {
        return region.to_string();
    }
    let host = host_of(config.endpoint.trim());
    host.strip_prefix("oss-")
        .and_then(|rest| rest.split('.').next())
        .map(|r| r.trim_end_matches("-internal"))
        .filter(|r| !r.is_empty())
        .unwrap_or(FALLBACK_REGION)
        .to_string()
}

/// Accept both `cn-hangzhou` and the `oss-cn-hangzhou` form.
fn bare_region(region: &str) -> &str {
    let region = region.trim();
    region.strip_prefix("oss-").unwrap_or(region)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AliyunOssConfig {
        AliyunOssConfig {
            region: "cn-hangzhou".to_string(),
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            bucket: "bucket".to_string(),
            ..AliyunOssConfig::default()
        }
    }

    #[test]
    fn test_region_endpoint() {
        assert_eq!(endpoint(&config()), "https://oss-cn-hangzhou.aliyuncs.com");

        let cfg = AliyunOssConfig {
            region: "oss-cn-beijing".to_string(),
            ..config()
        };
        assert_eq!(endpoint(&cfg), "https://oss-cn-beijing.aliyuncs.com");
        assert_eq!(signing_region(&cfg), "cn-beijing");
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let cfg = AliyunOssConfig {
            endpoint: "oss-cn-hangzhou-internal.aliyuncs.com".to_string(),
            ..config()
        };
        assert_eq!(endpoint(&cfg), "https://oss-cn-hangzhou-internal.aliyuncs.com");
    }

    #[test]
    fn test_cloud_box_endpoint() {
        let cfg = AliyunOssConfig {
            cloud_box_id: "cb-123".to_string(),
            endpoint: "ignored.example.com".to_string(),
            ..config()
        };
        assert_eq!(
            endpoint(&cfg),
            "https://cb-123.cn-hangzhou.oss-cloudbox.aliyuncs.com"
        );
    }

    #[test]
    fn test_v1_region_from_endpoint() {
        let cfg = AliyunOssConfig {
            region: String::new(),
            auth_version: "v1".to_string(),
            endpoint: "https://oss-cn-shanghai-internal.aliyuncs.com".to_string(),
            ..config()
        };
        assert_eq!(signing_region(&cfg), "cn-shanghai");

        let cfg = AliyunOssConfig {
            endpoint: "oss.example.internal".to_string(),
            ..cfg
        };
        assert_eq!(signing_region(&cfg), FALLBACK_REGION);
    }

    #[tokio::test]
    async fn test_v4_without_region_is_rejected() {
        let cfg = AliyunOssConfig {
            region: String::new(),
            ..config()
        };
        let err = AliyunOssStorage::new(&cfg).await.err().unwrap();
        assert!(err.is_argument_invalid());
    }

    #[tokio::test]
    async fn test_path_becomes_key_root() {
        let cfg = AliyunOssConfig {
            path: "/tenant-a/".to_string(),
            ..config()
        };
        let storage = AliyunOssStorage::new(&cfg).await.unwrap();
        assert_eq!(storage.bucket(), "bucket");
        assert_eq!(storage.key_root(), "tenant-a");
        assert_eq!(crate::Storage::vendor(&storage), Vendor::AliyunOss);
    }
}
