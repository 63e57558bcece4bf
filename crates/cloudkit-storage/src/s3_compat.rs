//! Storage over the S3 API
//!
//! AWS S3 and the vendors exposing an S3-compatible endpoint (Aliyun OSS,
//! Tencent COS, Huawei OBS, Volcengine TOS) share this implementation. Each
//! vendor is a distinct type, `S3CompatibleStorage<Flavor>`, whose flavor
//! fixes the vendor tag; the vendor modules own client construction.

use crate::error::{StorageError, StorageResult};
use crate::listing::{list_all, ListPage, PagedList, PAGE_SIZE};
use crate::traits::{ObjectPath, ObjectState, Storage};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{
    Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use cloudkit_core::{S3CredentialMode, Vendor};
use std::marker::PhantomData;

/// Marker for one S3-speaking vendor.
pub trait S3Flavor: Send + Sync + 'static {
    const VENDOR: Vendor;
}

/// Storage backed by an S3 API client bound to one bucket.
pub struct S3CompatibleStorage<F> {
    client: Client,
    bucket: String,
    /// Key root inside the bucket, without surrounding slashes. Usually empty.
    root: String,
    _flavor: PhantomData<fn() -> F>,
}

/// Everything needed to build an S3 API client.
pub(crate) struct ClientSettings<'a> {
    pub region: &'a str,
    pub endpoint: Option<&'a str>,
    pub path_style: bool,
    pub credentials: S3CredentialMode,
    pub access_key: &'a str,
    pub secret_key: &'a str,
    /// Only send/verify checksums when an operation requires them. Needed by
    /// S3-compatible services that reject the SDK's default CRC headers.
    pub relaxed_checksums: bool,
}

pub(crate) async fn build_client(settings: ClientSettings<'_>) -> Client {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(settings.region.to_string()));

    match settings.credentials {
        S3CredentialMode::Ambient => {}
        S3CredentialMode::Static => {
            loader = loader.credentials_provider(Credentials::new(
                settings.access_key,
                settings.secret_key,
                None,
                None,
                "cloudkit-static",
            ));
        }
        S3CredentialMode::Anonymous => {
            loader = loader.no_credentials();
        }
    }

    let sdk_config = loader.load().await;
    let mut builder =
        aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(settings.path_style);

    if let Some(endpoint) = settings.endpoint {
        builder = builder.endpoint_url(endpoint);
    }
    if settings.relaxed_checksums {
        builder = builder
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired);
    }

    Client::from_conf(builder.build())
}

/// A 404 status or an S3 not-found error code.
pub(crate) fn is_not_found<E>(err: &SdkError<E, HttpResponse>) -> bool
where
    E: ProvideErrorMetadata,
{
    if let Some(raw) = err.raw_response() {
        if raw.status().as_u16() == 404 {
            return true;
        }
    }
    matches!(err.code(), Some("NotFound") | Some("NoSuchKey"))
}

fn to_utc(value: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
    value
        .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
        .unwrap_or_default()
}

impl<F: S3Flavor> S3CompatibleStorage<F> {
    pub(crate) fn from_client(client: Client, bucket: impl Into<String>, root: &str) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            root: root.trim_matches('/').to_string(),
            _flavor: PhantomData,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Prefix every key is stored under, empty when keys map to the bucket root.
    pub fn key_root(&self) -> &str {
        &self.root
    }

    /// The underlying SDK client, for operations outside the storage contract.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn object_key(&self, key: &str) -> String {
        if self.root.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.root, key.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl<F: S3Flavor> PagedList for S3CompatibleStorage<F> {
    async fn list_page(&self, prefix: &str, token: Option<String>) -> StorageResult<ListPage> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix((!prefix.is_empty()).then(|| prefix.to_string()))
            .max_keys(PAGE_SIZE as i32)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    vendor = %F::VENDOR,
                    bucket = %self.bucket,
                    prefix = %prefix,
                    "S3 list page failed"
                );
                StorageError::backend(e)
            })?;

        Ok(ListPage {
            keys: resp
                .contents()
                .iter()
                .filter_map(|obj| obj.key().map(str::to_string))
                .collect(),
            truncated: resp.is_truncated().unwrap_or(false),
            next_token: resp.next_continuation_token().map(str::to_string),
        })
    }
}

#[async_trait]
impl<F: S3Flavor> Storage for S3CompatibleStorage<F> {
    async fn save(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let object_key = self.object_key(key);
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    vendor = %F::VENDOR,
                    bucket = %self.bucket,
                    key = %object_key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 save failed"
                );
                StorageError::backend(e)
            })?;

        tracing::info!(
            vendor = %F::VENDOR,
            bucket = %self.bucket,
            key = %object_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 save successful"
        );

        Ok(())
    }

    async fn load(&self, key: &str) -> StorageResult<Vec<u8>> {
        let object_key = self.object_key(key);
        let start = std::time::Instant::now();

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| {
                if !is_not_found(&e) {
                    tracing::error!(
                        error = %e,
                        vendor = %F::VENDOR,
                        bucket = %self.bucket,
                        key = %object_key,
                        "S3 load failed"
                    );
                }
                StorageError::backend(e)
            })?;

        let bytes = resp
            .body
            .collect()
            .await
            .map_err(StorageError::backend)?
            .into_bytes();

        tracing::debug!(
            vendor = %F::VENDOR,
            bucket = %self.bucket,
            key = %object_key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 load successful"
        );

        Ok(bytes.to_vec())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let object_key = self.object_key(key);
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(StorageError::backend(e)),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let object_key = self.object_key(key);
        let start = std::time::Instant::now();

        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(_) => {}
            // A 404 can also mean `NoSuchBucket`; only a missing key is success.
            Err(e) if e.code() == Some("NoSuchKey") => return Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    vendor = %F::VENDOR,
                    bucket = %self.bucket,
                    key = %object_key,
                    "S3 delete failed"
                );
                return Err(StorageError::backend(e));
            }
        }

        tracing::info!(
            vendor = %F::VENDOR,
            bucket = %self.bucket,
            key = %object_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn state(&self, key: &str) -> StorageResult<ObjectState> {
        let resp = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .map_err(StorageError::backend)?;

        Ok(ObjectState {
            size: resp.content_length().unwrap_or(0).max(0) as u64,
            last_modified: to_utc(resp.last_modified()),
        })
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectPath>> {
        list_all(self, &self.object_key(prefix)).await
    }

    fn vendor(&self) -> Vendor {
        F::VENDOR
    }
}
