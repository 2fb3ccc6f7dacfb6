use crate::verification::VerificationError;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HazDistError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid argument: {details}")]
    CliArgumentValidation { details: String },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server returned {status} for {url}")]
    Server { url: String, status: StatusCode },

    #[error("Failed to decode version response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Version endpoint {url} returned an empty version")]
    EmptyVersion { url: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Verification of {path} failed: {source}")]
    Verification {
        path: PathBuf,
        #[source]
        source: VerificationError,
    },

    #[error("Download failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: Box<HazDistError>,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

impl HazDistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
