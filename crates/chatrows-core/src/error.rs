//! Error types for the chatrows-core library.

use thiserror::Error;

/// Main error type for the chatrows library.
#[derive(Error, Debug)]
pub enum ChatrowsError {
    /// Transcript parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Row sink error.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// Webhook event payload could not be decoded.
    #[error("event payload error: {0}")]
    Event(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the strict parser entry points.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input is not text (for example, a body that is not valid UTF-8).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to parser configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configured literal produced a pattern that does not compile.
    #[error("invalid pattern for {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// An order type was declared without a prefix.
    #[error("order type {0} has an empty prefix")]
    EmptyPrefix(String),

    /// Two order types share a name.
    #[error("duplicate order type: {0}")]
    DuplicateType(String),

    /// A required literal (marker, keyword) is empty.
    #[error("missing required value: {0}")]
    MissingValue(String),

    /// The configuration file could not be read or written.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// Errors raised while appending rows to a sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// I/O failure in a file-backed sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or writing failed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// The destination refused the row.
    #[error("destination {destination} rejected row: {reason}")]
    Rejected { destination: String, reason: String },
}

/// Result type for the chatrows library.
pub type Result<T> = std::result::Result<T, ChatrowsError>;
