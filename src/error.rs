// 🚨 Error Taxonomy
// One variant per pipeline failure class; every stage returns EtlResult

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    /// Fetch failed: transport error, timeout or non-success status
    #[error("network error: {0}")]
    Network(String),

    /// Document has no usable structure (e.g. no table body)
    #[error("parse error: {0}")]
    Parse(String),

    /// A row matched the data-row heuristic but its content is unusable
    #[error("schema error: {0}")]
    Schema(String),

    /// Missing exchange rate, bad option value, unreadable config file
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Table write failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Read query rejected or failed
    #[error("query error: {0}")]
    Query(String),
}

pub type EtlResult<T> = Result<T, EtlError>;

impl EtlError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        EtlError::Io {
            context: context.into(),
            source,
        }
    }

    /// Short class name used in progress log lines
    pub fn kind(&self) -> &'static str {
        match self {
            EtlError::Network(_) => "NetworkError",
            EtlError::Parse(_) => "ParseError",
            EtlError::Schema(_) => "SchemaError",
            EtlError::Config(_) => "ConfigError",
            EtlError::Io { .. } => "IOError",
            EtlError::Storage(_) => "StorageError",
            EtlError::Query(_) => "QueryError",
        }
    }
}

impl From<reqwest::Error> for EtlError {
    fn from(err: reqwest::Error) -> Self {
        EtlError::Network(err.to_string())
    }
}
