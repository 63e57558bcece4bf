//! AWS S3 (and generic S3 endpoints such as MinIO)

use crate::endpoint::with_scheme;
use crate::error::{StorageError, StorageResult};
use crate::s3_compat::{build_client, is_not_found, ClientSettings, S3CompatibleStorage, S3Flavor};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use cloudkit_core::{S3Config, Vendor};

const DEFAULT_REGION: &str = "us-east-1";

pub struct AwsS3;

impl S3Flavor for AwsS3 {
    const VENDOR: Vendor = Vendor::S3;
}

/// S3 storage implementation
pub type S3Storage = S3CompatibleStorage<AwsS3>;

impl S3CompatibleStorage<AwsS3> {
    /// Validate `config`, build the client and make sure the bucket exists,
    /// creating it when HeadBucket reports it missing.
    pub async fn new(config: &S3Config) -> StorageResult<Self> {
        config.validate()?;

        let region = signing_region(config);
        let endpoint = endpoint(config);
        let client = build_client(ClientSettings {
            region: &region,
            endpoint: endpoint.as_deref(),
            path_style: config.use_path_style,
            credentials: config.credential_mode(),
            access_key: &config.access_key,
            secret_key: &config.secret_key,
            relaxed_checksums: endpoint.is_some(),
        })
        .await;

        ensure_bucket(&client, &config.bucket, &region).await?;

        tracing::info!(
            bucket = %config.bucket,
            region = %region,
            endpoint = endpoint.as_deref().unwrap_or("aws"),
            credentials = ?config.credential_mode(),
            "S3 storage initialized"
        );

        Ok(Self::from_client(client, config.bucket.clone(), ""))
    }
}

fn signing_region(config: &S3Config) -> String {
    let region = config.region.trim();
    if region.is_empty() {
        DEFAULT_REGION.to_string()
    } else {
        region.to_string()
    }
}

fn endpoint(config: &S3Config) -> Option<String> {
    let endpoint = config.endpoint.trim();
    (!endpoint.is_empty()).then(|| with_scheme(endpoint))
}

async fn ensure_bucket(client: &Client, bucket: &str, region: &str) -> StorageResult<()> {
    let head = client.head_bucket().bucket(bucket).send().await;
    match head {
        Ok(_) => Ok(()),
        Err(e) if is_not_found(&e) => {
            tracing::info!(bucket = %bucket, region = %region, "Bucket not found, creating");

            let mut request = client.create_bucket().bucket(bucket);
            if region != DEFAULT_REGION {
                request = request.create_bucket_configuration(
                    CreateBucketConfiguration::builder()
                        .location_constraint(BucketLocationConstraint::from(region))
                        .build(),
                );
            }
            request.send().await.map_err(|e| {
                StorageError::provider_init(e).with_detail(format!("create bucket {}", bucket))
            })?;
            Ok(())
        }
        Err(e) => {
            Err(StorageError::provider_init(e).with_detail(format!("head bucket {}", bucket)))
        }
    }
}
