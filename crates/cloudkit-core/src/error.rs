//! Configuration errors
//!
//! Raised while loading or validating a backend configuration. None of these
//! involve I/O beyond reading environment variables.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{vendor}: {field} must not be empty")]
    MissingField {
        vendor: &'static str,
        field: &'static str,
    },

    #[error("{vendor}: invalid {field} '{value}', expected one of [{allowed}]")]
    InvalidValue {
        vendor: &'static str,
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{vendor}: malformed {field}: {reason}")]
    Malformed {
        vendor: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("unsupported storage vendor: {0}")]
    UnknownVendor(String),

    #[error("environment variable {var}: {reason}")]
    Env { var: String, reason: String },
}

impl ConfigError {
    pub(crate) fn missing(vendor: &'static str, field: &'static str) -> Self {
        ConfigError::MissingField { vendor, field }
    }

    pub(crate) fn invalid(
        vendor: &'static str,
        field: &'static str,
        value: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        ConfigError::InvalidValue {
            vendor,
            field,
            value: value.into(),
            allowed: allowed
                .iter()
                .map(|a| if a.is_empty() { "\"\"" } else { *a })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = ConfigError::missing("s3", "bucket");
        assert_eq!(err.to_string(), "s3: bucket must not be empty");
    }

    #[test]
    fn test_invalid_value_lists_empty_choice() {
        let err = ConfigError::invalid("aliyun", "auth_version", "v2", &["", "v1", "v4"]);
        assert_eq!(
            err.to_string(),
            "aliyun: invalid auth_version 'v2', expected one of [\"\", v1, v4]"
        );
    }
}
