//! Error types for the monitoring service.
//!
//! Each layer gets its own enum so callers can tell a remote outage apart
//! from a local storage problem.

use std::path::PathBuf;

/// Failure talking to the upstream API.
///
/// Any `FetchError` means "unavailable, try again later". It never means
/// the upstream has no data; that case is an `Ok` with an empty list.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not the JSON shape we expect.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Failure in the local measurement store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure loading `airmon.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
