//! Configuration module
//!
//! `BackendConfig` carries the parameter set of exactly one storage backend.
//! Each variant validates its own fields; validation is pure and never touches
//! the network. `BackendConfig::from_env` builds a variant from environment
//! variables (and a `.env` file when present).

use std::env;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::connection_string::AzureConnectionString;
use crate::error::ConfigError;
use crate::vendor::Vendor;

/// Environment variable holding the vendor tag for `BackendConfig::load_env`.
pub const VENDOR_ENV: &str = "CLOUDKIT_STORAGE_VENDOR";

const SIGNATURE_VERSIONS: [&str; 4] = ["", "v4", "s3v4", "unsigned"];
const ALIYUN_AUTH_VERSIONS: [&str; 3] = ["", "v1", "v4"];

/// Configuration for one storage backend.
///
/// Serialized with an internal `type` tag holding the vendor tag, e.g.
/// `{"type": "local", "path": "/var/lib/cloudkit"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendConfig {
    #[serde(rename = "local")]
    Local(LocalConfig),
    #[serde(rename = "s3")]
    S3(S3Config),
    #[serde(rename = "azure")]
    AzureBlob(AzureBlobConfig),
    #[serde(rename = "aliyun")]
    AliyunOss(AliyunOssConfig),
    #[serde(rename = "tencent")]
    TencentCos(TencentCosConfig),
    #[serde(rename = "gcs")]
    GoogleCloudStorage(GoogleCloudStorageConfig),
    #[serde(rename = "huawei")]
    HuaweiObs(HuaweiObsConfig),
    #[serde(rename = "volcengine")]
    VolcengineTos(VolcengineTosConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// Talk to AWS proper (region endpoints, ambient credential chain).
    pub use_aws: bool,
    pub use_path_style: bool,
    pub use_iam_role: bool,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    /// "", "v4", "s3v4" or "unsigned"; empty means v4.
    pub signature_version: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            use_aws: true,
            use_path_style: false,
            use_iam_role: false,
            access_key: String::new(),
            secret_key: String::new(),
            bucket: String::new(),
            region: String::new(),
            endpoint: String::new(),
            signature_version: String::new(),
        }
    }
}

/// How an S3 client obtains credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum S3CredentialMode {
    /// AWS default provider chain (env, profile, IMDS/IRSA role).
    Ambient,
    /// The configured access key pair.
    Static,
    /// No signing at all.
    Anonymous,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureBlobConfig {
    pub connection_string: String,
    pub container_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliyunOssConfig {
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// "", "v1" or "v4"; empty means v4.
    pub auth_version: String,
    /// Root inside the bucket that every key is stored under.
    pub path: String,
    pub bucket: String,
    pub cloud_box_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TencentCosConfig {
    pub region: String,
    pub secret_id: String,
    pub secret_key: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleCloudStorageConfig {
    pub bucket: String,
    /// Service account JSON, base64 encoded.
    pub credentials_b64: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuaweiObsConfig {
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub server: String,
    pub path_style: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolcengineTosConfig {
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

fn require(vendor: Vendor, field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::missing(vendor.as_str(), field));
    }
    Ok(())
}

fn one_of(
    vendor: Vendor,
    field: &'static str,
    value: &str,
    allowed: &[&str],
) -> Result<(), ConfigError> {
    let normalized = value.trim().to_lowercase();
    if allowed.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(vendor.as_str(), field, value, allowed))
    }
}

impl BackendConfig {
    pub fn vendor(&self) -> Vendor {
        match self {
            BackendConfig::Local(_) => Vendor::Local,
            BackendConfig::S3(_) => Vendor::S3,
            BackendConfig::AzureBlob(_) => Vendor::AzureBlob,
            BackendConfig::AliyunOss(_) => Vendor::AliyunOss,
            BackendConfig::TencentCos(_) => Vendor::TencentCos,
            BackendConfig::GoogleCloudStorage(_) => Vendor::GoogleCloudStorage,
            BackendConfig::HuaweiObs(_) => Vendor::HuaweiObs,
            BackendConfig::VolcengineTos(_) => Vendor::VolcengineTos,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            BackendConfig::Local(c) => c.validate(),
            BackendConfig::S3(c) => c.validate(),
            BackendConfig::AzureBlob(c) => c.validate(),
            BackendConfig::AliyunOss(c) => c.validate(),
            BackendConfig::TencentCos(c) => c.validate(),
            BackendConfig::GoogleCloudStorage(c) => c.validate(),
            BackendConfig::HuaweiObs(c) => c.validate(),
            BackendConfig::VolcengineTos(c) => c.validate(),
        }
    }

    /// Read the vendor tag from `CLOUDKIT_STORAGE_VENDOR`, then that vendor's
    /// variables.
    pub fn load_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let vendor = parse_vendor_var(env::var(VENDOR_ENV).ok())?;
        Self::from_env(vendor)
    }

    /// Build the configuration for `vendor` from environment variables.
    ///
    /// Unset variables become empty strings (booleans fall back to their
    /// defaults); the result still has to pass `validate`.
    pub fn from_env(vendor: Vendor) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = match vendor {
            Vendor::Local => BackendConfig::Local(LocalConfig {
                path: env_string("LOCAL_STORAGE_PATH"),
            }),
            Vendor::S3 => BackendConfig::S3(S3Config {
                use_aws: env_bool("AWS_S3_USE_AWS", true)?,
                use_path_style: env_bool("AWS_S3_USE_PATH_STYLE", false)?,
                use_iam_role: env_bool("AWS_S3_USE_IAM_ROLE", false)?,
                access_key: env_string("AWS_S3_ACCESS_KEY"),
                secret_key: env_string("AWS_S3_SECRET_KEY"),
                bucket: env_string("AWS_S3_BUCKET"),
                region: env_string("AWS_S3_REGION"),
                endpoint: env_string("AWS_S3_ENDPOINT"),
                signature_version: env_string("AWS_S3_SIGNATURE_VERSION"),
            }),
            Vendor::AzureBlob => BackendConfig::AzureBlob(AzureBlobConfig {
                connection_string: env_string("AZURE_CONNECTION"),
                container_name: env_string("AZURE_CONTAINER"),
            }),
            Vendor::AliyunOss => BackendConfig::AliyunOss(AliyunOssConfig {
                region: env_string("ALIYUN_OSS_REGION"),
                endpoint: env_string("ALIYUN_OSS_ENDPOINT"),
                access_key: env_string("ALIYUN_OSS_ACCESS_KEY"),
                secret_key: env_string("ALIYUN_OSS_SECRET_KEY"),
                auth_version: env_string("ALIYUN_OSS_AUTH_VERSION"),
                path: env_string("ALIYUN_OSS_PATH"),
                bucket: env_string("ALIYUN_OSS_BUCKET"),
                cloud_box_id: env_string("ALIYUN_OSS_CLOUDBOX_ID"),
            }),
            Vendor::TencentCos => BackendConfig::TencentCos(TencentCosConfig {
                region: env_string_or("TENCENT_COS_REGION", "TENCNET_COS_REGION"),
                secret_id: env_string_or("TENCENT_COS_SECRET_ID", "TENCNET_COS_SECRET_ID"),
                secret_key: env_string_or("TENCENT_COS_SECRET_KEY", "TENCNET_COS_SECRET_KEY"),
                bucket: env_string_or("TENCENT_COS_BUCKET", "TENCNET_COS_BUCKET"),
            }),
            Vendor::GoogleCloudStorage => {
                BackendConfig::GoogleCloudStorage(GoogleCloudStorageConfig {
                    bucket: env_string("GCS_BUCKET"),
                    credentials_b64: env_string("GCS_CREDENTIALS"),
                })
            }
            Vendor::HuaweiObs => BackendConfig::HuaweiObs(HuaweiObsConfig {
                bucket: env_string("HUAWEI_OBS_BUCKET"),
                access_key: env_string("HUAWEI_OBS_ACCESS_KEY"),
                secret_key: env_string("HUAWEI_OBS_SECRET_KEY"),
                server: env_string("HUAWEI_OBS_SERVER"),
                path_style: env_bool("HUAWEI_OBS_PATH_STYLE", false)?,
            }),
            Vendor::VolcengineTos => BackendConfig::VolcengineTos(VolcengineTosConfig {
                region: env_string("VOLCENGINE_TOS_REGION"),
                endpoint: env_string("VOLCENGINE_TOS_ENDPOINT"),
                access_key: env_string("VOLCENGINE_TOS_ACCESS_KEY"),
                secret_key: env_string("VOLCENGINE_TOS_SECRET_KEY"),
                bucket: env_string("VOLCENGINE_TOS_BUCKET"),
            }),
        };

        Ok(config)
    }
}

impl LocalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(Vendor::Local, "path", &self.path)
    }
}

impl S3Config {
    pub fn credential_mode(&self) -> S3CredentialMode {
        let no_keys = self.access_key.is_empty() && self.secret_key.is_empty();
        if self.use_aws && (self.use_iam_role || no_keys) {
            S3CredentialMode::Ambient
        } else if self.signature_version.trim().eq_ignore_ascii_case("unsigned") {
            S3CredentialMode::Anonymous
        } else {
            S3CredentialMode::Static
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require(Vendor::S3, "bucket", &self.bucket)?;
        one_of(
            Vendor::S3,
            "signature_version",
            &self.signature_version,
            &SIGNATURE_VERSIONS,
        )?;
        if !self.use_aws {
            require(Vendor::S3, "endpoint", &self.endpoint)?;
        }
        if self.credential_mode() == S3CredentialMode::Static {
            require(Vendor::S3, "access_key", &self.access_key)?;
            require(Vendor::S3, "secret_key", &self.secret_key)?;
        }
        Ok(())
    }
}

impl AzureBlobConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(Vendor::AzureBlob, "connection_string", &self.connection_string)?;
        require(Vendor::AzureBlob, "container_name", &self.container_name)?;
        self.parsed_connection_string().map(|_| ())
    }

    pub fn parsed_connection_string(&self) -> Result<AzureConnectionString, ConfigError> {
        self.connection_string.parse()
    }
}

impl AliyunOssConfig {
    /// Whether requests are signed with V4 (the default).
    pub fn is_v4(&self) -> bool {
        let version = self.auth_version.trim();
        version.is_empty() || version.eq_ignore_ascii_case("v4")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let vendor = Vendor::AliyunOss;
        require(vendor, "bucket", &self.bucket)?;
        require(vendor, "access_key", &self.access_key)?;
        require(vendor, "secret_key", &self.secret_key)?;
        one_of(vendor, "auth_version", &self.auth_version, &ALIYUN_AUTH_VERSIONS)?;

        if !self.cloud_box_id.trim().is_empty() {
            if !self.is_v4() {
                return Err(ConfigError::invalid(
                    vendor.as_str(),
                    "auth_version",
                    &self.auth_version,
                    &["", "v4"],
                ));
            }
            require(vendor, "region", &self.region)?;
        } else if self.is_v4() {
            require(vendor, "region", &self.region)?;
        } else if self.endpoint.trim().is_empty() {
            require(vendor, "region", &self.region)?;
        }
        Ok(())
    }
}

impl TencentCosConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vendor = Vendor::TencentCos;
        require(vendor, "region", &self.region)?;
        require(vendor, "secret_id", &self.secret_id)?;
        require(vendor, "secret_key", &self.secret_key)?;
        require(vendor, "bucket", &self.bucket)
    }
}

impl GoogleCloudStorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(Vendor::GoogleCloudStorage, "bucket", &self.bucket)?;
        require(
            Vendor::GoogleCloudStorage,
            "credentials_b64",
            &self.credentials_b64,
        )?;
        self.credentials_json().map(|_| ())
    }

    /// Decoded service account JSON.
    pub fn credentials_json(&self) -> Result<String, ConfigError> {
        let malformed = |reason: String| ConfigError::Malformed {
            vendor: Vendor::GoogleCloudStorage.as_str(),
            field: "credentials_b64",
            reason,
        };
        let raw = base64::engine::general_purpose::STANDARD
            .decode(self.credentials_b64.trim())
            .map_err(|e| malformed(e.to_string()))?;
        String::from_utf8(raw).map_err(|e| malformed(e.to_string()))
    }
}

impl HuaweiObsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vendor = Vendor::HuaweiObs;
        require(vendor, "bucket", &self.bucket)?;
        require(vendor, "access_key", &self.access_key)?;
        require(vendor, "secret_key", &self.secret_key)?;
        require(vendor, "server", &self.server)
    }
}

impl VolcengineTosConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vendor = Vendor::VolcengineTos;
        require(vendor, "region", &self.region)?;
        require(vendor, "access_key", &self.access_key)?;
        require(vendor, "secret_key", &self.secret_key)?;
        require(vendor, "bucket", &self.bucket)
    }
}

fn parse_vendor_var(raw: Option<String>) -> Result<Vendor, ConfigError> {
    match raw {
        Some(tag) if !tag.trim().is_empty() => tag.parse(),
        _ => Err(ConfigError::Env {
            var: VENDOR_ENV.to_string(),
            reason: "not set".to_string(),
        }),
    }
}

fn env_string(var: &str) -> String {
    env::var(var).unwrap_or_default()
}

/// `var`, falling back to `legacy` when `var` is unset or empty.
fn env_string_or(var: &str, legacy: &str) -> String {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => env_string(legacy),
    }
}

fn env_bool(var: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::Env {
                var: var.to_string(),
                reason: format!("expected a boolean, got '{}'", other),
            }),
        },
    }
}
