//! Errors surfaced by the command line.

use std::path::PathBuf;

use swagts_core::ResolveError;
use thiserror::Error;

/// Everything that can stop a generation run.
#[derive(Error, Debug)]
pub enum CliError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this tool.
    #[error("Invalid config {}: {source}", path.display())]
    ConfigParse {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// Neither the command line nor the config names a document.
    #[error("No OpenAPI document given; pass --url or set `url` in the config file")]
    MissingUrl,

    /// Neither the command line nor the config names an output file.
    #[error("No output file given; pass OUTPUT or set `output` in the config file")]
    MissingOutput,

    /// A local file could not be read or written.
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The HTTP request failed.
    #[error("Request to {url} failed: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying error.
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: reqwest::StatusCode,
    },

    /// The document is not JSON.
    #[error("{origin} is not valid JSON: {source}")]
    Json {
        /// URL or path the document came from.
        origin: String,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The document could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The client template failed to render.
    #[error("Failed to render client: {0}")]
    Render(#[from] tera::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingUrl | Self::MissingOutput => 2,
            _ => 1,
        }
    }
}
