use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ConfigError;

/// Storage vendor tags
///
/// Every backend handle reports one of these through `Storage::vendor`, and the
/// factory resolves the tag string a caller passes in against this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Vendor {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "s3")]
    S3,
    #[serde(rename = "azure")]
    AzureBlob,
    #[serde(rename = "aliyun")]
    AliyunOss,
    #[serde(rename = "tencent")]
    TencentCos,
    #[serde(rename = "gcs")]
    GoogleCloudStorage,
    #[serde(rename = "huawei")]
    HuaweiObs,
    #[serde(rename = "volcengine")]
    VolcengineTos,
}

impl Vendor {
    pub const ALL: [Vendor; 8] = [
        Vendor::Local,
        Vendor::S3,
        Vendor::AzureBlob,
        Vendor::AliyunOss,
        Vendor::TencentCos,
        Vendor::GoogleCloudStorage,
        Vendor::HuaweiObs,
        Vendor::VolcengineTos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Local => "local",
            Vendor::S3 => "s3",
            Vendor::AzureBlob => "azure",
            Vendor::AliyunOss => "aliyun",
            Vendor::TencentCos => "tencent",
            Vendor::GoogleCloudStorage => "gcs",
            Vendor::HuaweiObs => "huawei",
            Vendor::VolcengineTos => "volcengine",
        }
    }

    /// Name of the configuration variant this vendor is built from.
    pub fn config_field(&self) -> &'static str {
        match self {
            Vendor::Local => "Local",
            Vendor::S3 => "S3",
            Vendor::AzureBlob => "AzureBlob",
            Vendor::AliyunOss => "AliyunOSS",
            Vendor::TencentCos => "TencentCOS",
            Vendor::GoogleCloudStorage => "GoogleCloudStorage",
            Vendor::HuaweiObs => "HuaweiOBS",
            Vendor::VolcengineTos => "VolcengineTOS",
        }
    }
}

impl FromStr for Vendor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Vendor::ALL
            .into_iter()
            .find(|v| v.as_str() == tag)
            .ok_or_else(|| ConfigError::UnknownVendor(s.to_string()))
    }
}

impl Display for Vendor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for vendor in Vendor::ALL {
            assert_eq!(vendor.to_string().parse::<Vendor>().unwrap(), vendor);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(" S3 ".parse::<Vendor>().unwrap(), Vendor::S3);
        assert_eq!("VolcEngine".parse::<Vendor>().unwrap(), Vendor::VolcengineTos);
    }

    #[test]
    fn test_unknown_tag() {
        let err = "minio".parse::<Vendor>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownVendor(ref tag) if tag == "minio"));
    }
}
