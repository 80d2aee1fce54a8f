use thiserror::Error;

/// Failure of a single `fetch_page` call.
///
/// The loader never surfaces these to its caller; they are logged and the
/// collection is left as it was before the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed page payload: {0}")]
    Malformed(String),
    #[error("{0}")]
    Source(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("start page must be at least 1")]
    ZeroStartPage,
    #[error("port must not be 0")]
    ZeroPort,
    #[error("page size must be between 1 and {max}, got {got}")]
    PageSize { got: u32, max: u32 },
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
