// Error types for the ESPN client, response cache and league parsing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize cached response: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EspnError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ESPN returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid league URL `{url}`: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("unexpected league response shape: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
