//! Settings from the command line and an optional TOML file.
//!
//! Values given on the command line win over the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use swagts_core::GenerationOptions;
use tracing::debug;

use crate::Cli;
use crate::error::CliError;

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Document URL or local path.
    pub url: Option<String>,
    /// Output file.
    pub output: Option<PathBuf>,
    /// Accept invalid TLS certificates.
    pub ignore_ssl_errors: Option<bool>,
    /// Basic auth user.
    pub user: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Generation options.
    #[serde(flatten)]
    pub options: GenerationOptions,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Basic auth credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub user: String,
    /// Password.
    pub password: Option<String>,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Document URL or local path.
    pub source: String,
    /// Output file.
    pub output: PathBuf,
    /// Accept invalid TLS certificates.
    pub ignore_ssl_errors: bool,
    /// Basic auth credentials, if a user is configured.
    pub credentials: Option<Credentials>,
    /// Generation options.
    pub options: GenerationOptions,
}

impl Settings {
    /// Merge command-line arguments over the config file they name.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let file = match &cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                FileConfig::load(path)?
            }
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Merge command-line arguments over already loaded file values.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self, CliError> {
        let source = cli.url.clone().or(file.url).ok_or(CliError::MissingUrl)?;
        let output = cli
            .output
            .clone()
            .or(file.output)
            .ok_or(CliError::MissingOutput)?;

        let mut options = file.options;
        if cli.referenced_objects_nullable_by_default {
            options.referenced_objects_nullable_by_default = true;
        }
        if !cli.include_tags.is_empty() {
            options.include_tags = cli.include_tags.iter().cloned().collect();
        }
        if !cli.exclude_tags.is_empty() {
            options.exclude_tags = cli.exclude_tags.iter().cloned().collect();
        }

        let credentials = cli.user.clone().or(file.user).map(|user| Credentials {
            user,
            password: cli.password.clone().or(file.password),
        });

        Ok(Self {
            source,
            output,
            ignore_ssl_errors: cli.ignore_ssl_errors || file.ignore_ssl_errors.unwrap_or(false),
            credentials,
            options,
        })
    }
}
