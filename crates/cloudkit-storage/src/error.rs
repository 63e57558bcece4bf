//! Storage error taxonomy
//!
//! Construction problems are `ArgumentInvalid` or `ProviderInit`. Operation
//! failures carry the transport's own error unchanged (`Backend`, `Io`), so
//! callers can downcast to the vendor SDK type when they need to.

use cloudkit_core::ConfigError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid argument{}", describe(.detail, .source))]
    ArgumentInvalid {
        detail: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("provider init failed{}", describe(.detail, .source))]
    ProviderInit {
        detail: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Backend(BoxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

fn describe(detail: &Option<String>, source: &Option<BoxError>) -> String {
    match (detail, source) {
        (Some(d), Some(s)) => format!(": {}: {}", d, s),
        (Some(d), None) => format!(": {}", d),
        (None, Some(s)) => format!(": {}", s),
        (None, None) => String::new(),
    }
}

impl StorageError {
    pub fn argument_invalid(detail: impl Into<String>) -> Self {
        StorageError::ArgumentInvalid {
            detail: Some(detail.into()),
            source: None,
        }
    }

    pub fn provider_init<E>(cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        StorageError::ProviderInit {
            detail: None,
            source: Some(cause.into()),
        }
    }

    pub fn backend<E>(cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        StorageError::Backend(cause.into())
    }

    /// Attach free-text detail to a construction error. Other kinds are returned as-is.
    pub fn with_detail(self, text: impl Into<String>) -> Self {
        match self {
            StorageError::ArgumentInvalid { source, .. } => StorageError::ArgumentInvalid {
                detail: Some(text.into()),
                source,
            },
            StorageError::ProviderInit { source, .. } => StorageError::ProviderInit {
                detail: Some(text.into()),
                source,
            },
            other => other,
        }
    }

    /// Attach the underlying cause to a construction error. Other kinds are returned as-is.
    pub fn with_source<E>(self, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        match self {
            StorageError::ArgumentInvalid { detail, .. } => StorageError::ArgumentInvalid {
                detail,
                source: Some(cause.into()),
            },
            StorageError::ProviderInit { detail, .. } => StorageError::ProviderInit {
                detail,
                source: Some(cause.into()),
            },
            other => other,
        }
    }

    pub fn is_argument_invalid(&self) -> bool {
        matches!(self, StorageError::ArgumentInvalid { .. })
    }

    pub fn is_provider_init(&self) -> bool {
        matches!(self, StorageError::ProviderInit { .. })
    }
}

impl From<ConfigError> for StorageError {
    fn from(err: ConfigError) -> Self {
        StorageError::ArgumentInvalid {
            detail: None,
            source: Some(Box::new(err)),
        }
    }
}
