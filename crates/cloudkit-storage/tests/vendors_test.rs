//! Lifecycle tests against real vendor accounts.
//!
//! Each test runs only when its vendor's variables are set (directly or in
//! `.env`) and passes silently otherwise.

#[path = "helpers/mod.rs"]
mod helpers;

use cloudkit_storage::{create_storage, BackendConfig, Vendor};
use helpers::{env_present, init_tracing, random_prefix, run_lifecycle};

async fn lifecycle_if_configured(vendor: Vendor, required: &[&str]) {
    init_tracing();
    if !env_present(required) {
        eprintln!("skipping {} lifecycle: {:?} not set", vendor, required);
        return;
    }

    let config = BackendConfig::from_env(vendor).unwrap();
    let storage = create_storage(&config).await.unwrap();
    assert_eq!(storage.vendor(), vendor);

    run_lifecycle(storage.as_ref(), &random_prefix(vendor.as_str())).await;
}

#[cfg(feature = "storage-s3")]
#[tokio::test]
async fn test_s3_lifecycle() {
    lifecycle_if_configured(Vendor::S3, &["AWS_S3_BUCKET"]).await;
}

#[cfg(feature = "storage-s3")]
#[tokio::test]
async fn test_aliyun_lifecycle() {
    lifecycle_if_configured(
        Vendor::AliyunOss,
        &[
            "ALIYUN_OSS_BUCKET",
            "ALIYUN_OSS_ACCESS_KEY",
            "ALIYUN_OSS_SECRET_KEY",
            "ALIYUN_OSS_REGION",
        ],
    )
    .await;
}

#[cfg(feature = "storage-s3")]
#[tokio::test]
async fn test_tencent_lifecycle() {
    lifecycle_if_configured(
        Vendor::TencentCos,
        &[
            "TENCENT_COS_REGION",
            "TENCENT_COS_SECRET_ID",
            "TENCENT_COS_SECRET_KEY",
            "TENCENT_COS_BUCKET",
        ],
    )
    .await;
}

#[cfg(feature = "storage-s3")]
#[tokio::test]
async fn test_huawei_lifecycle() {
    lifecycle_if_configured(
        Vendor::HuaweiObs,
        &[
            "HUAWEI_OBS_BUCKET",
            "HUAWEI_OBS_ACCESS_KEY",
            "HUAWEI_OBS_SECRET_KEY",
            "HUAWEI_OBS_SERVER",
        ],
    )
    .await;
}

#[cfg(feature = "storage-s3")]
#[tokio::test]
async fn test_volcengine_lifecycle() {
    lifecycle_if_configured(
        Vendor::VolcengineTos,
        &[
            "VOLCENGINE_TOS_REGION",
            "VOLCENGINE_TOS_ACCESS_KEY",
            "VOLCENGINE_TOS_SECRET_KEY",
            "VOLCENGINE_TOS_BUCKET",
        ],
    )
    .await;
}

#[cfg(feature = "storage-azure")]
#[tokio::test]
async fn test_azure_lifecycle() {
    lifecycle_if_configured(Vendor::AzureBlob, &["AZURE_CONNECTION", "AZURE_CONTAINER"]).await;
}

#[cfg(feature = "storage-gcs")]
#[tokio::test]
async fn test_gcs_lifecycle() {
    lifecycle_if_configured(Vendor::GoogleCloudStorage, &["GCS_BUCKET", "GCS_CREDENTIALS"]).await;
}
