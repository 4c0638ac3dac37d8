//! Error types for annofetch
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for the download pipeline
#[derive(Debug, Error)]
pub enum AnnofetchError {
    /// Chromosome renaming errors
    #[error("Rename error: {0}")]
    Rename(#[from] RenameError),

    /// Remote transfer errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors that can occur while loading a chromosome mapping table
#[derive(Debug, Error)]
pub enum MappingError {
    /// Mapping file exists but could not be read
    #[error("Failed to read mapping file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while renaming a FASTA/GTF stream
///
/// Per-record anomalies never show up here; they are tallied in
/// [`RenameStats`](crate::formats::RenameStats).
#[derive(Debug, Error)]
pub enum RenameError {
    /// Reading or decompressing the input failed
    #[error("Failed to read input at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// Writing the output failed
    #[error("Failed to write output: {0}")]
    Write(#[source] std::io::Error),

    /// Input file could not be opened
    #[error("Failed to open input {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be created or moved into place
    #[error("Failed to create output {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during a remote transfer
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport level failure (DNS, TLS, connection reset...)
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}; check species, release and build")]
    Status { status: u16, url: String },

    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors caused by invalid user supplied parameters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required parameter was empty
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),

    /// Release numbers start at 1
    #[error("Invalid release number: {0}")]
    InvalidRelease(u32),

    /// File format could not be inferred from the path
    #[error("Cannot infer FASTA/GTF format from {0}; pass --format")]
    UnknownFormat(PathBuf),
}

/// Result type alias for annofetch operations
pub type Result<T> = std::result::Result<T, AnnofetchError>;

/// Result type alias for mapping table operations
pub type MappingResult<T> = std::result::Result<T, MappingError>;

/// Result type alias for renaming operations
pub type RenameResult<T> = std::result::Result<T, RenameError>;

/// Result type alias for remote transfer operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;
