use thiserror::Error;

/// Failures of the key-value storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.into(),
            source,
        }
    }
}

/// Why a location lookup tier was abandoned. Never leaves the probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("lookup request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("lookup returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("lookup rejected the request: {0}")]
    Rejected(String),
    #[error("lookup response is missing `{0}`")]
    MissingField(&'static str),
}
