use shared::{error::SearchError, protocol::LoadResult};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),
}

impl From<FetchError> for SearchError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Timeout => SearchError::Timeout,
            FetchError::Connection(reason) => SearchError::Connection(reason),
            FetchError::HttpStatus(code) => SearchError::HttpStatus(code),
        }
    }
}

impl From<FetchError> for LoadResult {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Connection(_) => LoadResult::NetworkUnavailable,
            other => LoadResult::Failure(other.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("connect and read timeouts must be non-zero and distinct (connect={connect_ms}ms, read={read_ms}ms)")]
    InvalidTimeouts { connect_ms: u64, read_ms: u64 },
    #[error("max results must be between 1 and {max}, got {actual}")]
    InvalidMaxResults { max: u32, actual: u32 },
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}
