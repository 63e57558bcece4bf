//! Azure storage connection strings
//!
//! `DefaultEndpointsProtocol=https;AccountName=..;AccountKey=..;EndpointSuffix=core.windows.net`
//! and the SAS / emulator forms. Keys are matched case-insensitively and
//! unknown keys are ignored.

use std::str::FromStr;

use crate::error::ConfigError;

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";
const FIELD: &str = "connection_string";
const VENDOR: &str = "azure";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureConnectionString {
    pub account_name: Option<String>,
    pub account_key: Option<String>,
    pub sas_token: Option<String>,
    pub blob_endpoint: Option<String>,
    pub protocol: Option<String>,
    pub endpoint_suffix: Option<String>,
    pub use_development_storage: bool,
}

impl AzureConnectionString {
    /// Blob service endpoint, either explicit or derived from account and suffix.
    pub fn blob_endpoint(&self) -> Option<String> {
        if let Some(endpoint) = &self.blob_endpoint {
            return Some(endpoint.trim_end_matches('/').to_string());
        }
        let account = self.account_name.as_deref()?;
        Some(format!(
            "{}://{}.blob.{}",
            self.protocol.as_deref().unwrap_or("https"),
            account,
            self.endpoint_suffix
                .as_deref()
                .unwrap_or(DEFAULT_ENDPOINT_SUFFIX)
        ))
    }

    fn check_complete(&self) -> Result<(), ConfigError> {
        if self.use_development_storage {
            return Ok(());
        }
        let has_account = self.account_name.is_some();
        let has_secret = self.account_key.is_some() || self.sas_token.is_some();
        if has_account && has_secret {
            return Ok(());
        }
        if self.blob_endpoint.is_some() && self.sas_token.is_some() {
            return Ok(());
        }
        Err(ConfigError::Malformed {
            vendor: VENDOR,
            field: FIELD,
            reason: "expected AccountName with AccountKey or SharedAccessSignature, \
                     BlobEndpoint with SharedAccessSignature, or UseDevelopmentStorage=true"
                .to_string(),
        })
    }
}

impl FromStr for AzureConnectionString {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parsed = AzureConnectionString::default();

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            // Account keys are base64 and may end in '='; only the first one separates.
            let (key, value) = segment.split_once('=').ok_or_else(|| ConfigError::Malformed {
                vendor: VENDOR,
                field: FIELD,
                reason: format!("segment without '=' near '{}'", key_hint(segment)),
            })?;
            let value = value.trim().to_string();

            match key.trim().to_ascii_lowercase().as_str() {
                "accountname" => parsed.account_name = Some(value),
                "accountkey" => parsed.account_key = Some(value),
                "sharedaccesssignature" => parsed.sas_token = Some(value),
                "blobendpoint" => parsed.blob_endpoint = Some(value),
                "defaultendpointsprotocol" => parsed.protocol = Some(value),
                "endpointsuffix" => parsed.endpoint_suffix = Some(value),
                "usedevelopmentstorage" => {
                    parsed.use_development_storage = value.eq_ignore_ascii_case("true")
                }
                _ => {}
            }
        }

        parsed.check_complete()?;
        Ok(parsed)
    }
}

// Never echo a whole segment back: it may be a secret.
fn key_hint(segment: &str) -> String {
    segment.chars().take(12).collect()
}
