//! Error types for schemawiki
//!
//! This module defines all error types used throughout the library.
//! The taxonomy separates recoverable pipeline failures (ingestion,
//! transport) from structural misuse (publishing before ingestion,
//! decoding a page without a structured-data block).

use thiserror::Error;

/// Result type alias using schemawiki Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for schemawiki operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema source could not be parsed or located
    #[error("ingestion error: {0}")]
    Ingestion(String),

    /// A publish operation was invoked before a successful ingestion
    #[error("no schema has been ingested")]
    NotIngested,

    /// Page content carries no structured-data block
    #[error("no dataentry block found on the page")]
    StructDataNotFound,

    /// The wiki transport reported a failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration loading error
    #[error("config error: {0}")]
    Config(String),

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
