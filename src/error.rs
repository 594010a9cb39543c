//! Error types for the replay trader

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the replay trader
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Feed errors
    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Empty feed: no samples survived indicator warm-up")]
    EmptyFeed,

    #[error("Malformed bar at line {line}: {reason}")]
    MalformedBar { line: u64, reason: String },

    // Oracle errors
    #[error("Oracle transport error: {0}")]
    OracleTransport(String),

    #[error("Oracle returned unparsable verdict: {0}")]
    OracleUnparsable(String),

    #[error("Oracle key pool is empty")]
    OracleNoKeys,

    #[error("All oracle endpoints failed after {attempts} attempts")]
    OracleExhausted { attempts: usize },

    // Export errors
    #[error("Export failed: {0}")]
    Export(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::OracleTransport(_) | Error::OracleUnparsable(_))
    }
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::OracleTransport(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from csv errors
impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Feed(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
