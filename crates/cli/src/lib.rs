//! Command-line front end: fetch an OpenAPI document, resolve it, render a
//! TypeScript client and write it to disk.

pub mod config;
pub mod error;
pub mod fetch;
pub mod render;

use std::path::{Path, PathBuf};

use clap::Parser;
use swagts_core::resolve_value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::Settings;
use crate::error::CliError;
use crate::fetch::{FetchOptions, fetch_document};
use crate::render::Renderer;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "swagts",
    version,
    about = "Generate a typed TypeScript client from an OpenAPI document"
)]
pub struct Cli {
    /// File to write the generated client to
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
    /// URL or local path of the OpenAPI document
    #[arg(long)]
    pub url: Option<String>,
    /// TOML file with default settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Make properties referencing objects nullable unless they opt out
    #[arg(long)]
    pub referenced_objects_nullable_by_default: bool,
    /// Only generate operations with one of these tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub include_tags: Vec<String>,
    /// Skip operations with any of these tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude_tags: Vec<String>,
    /// Accept invalid TLS certificates when fetching the document
    #[arg(long)]
    pub ignore_ssl_errors: bool,
    /// Basic auth user
    #[arg(long)]
    pub user: Option<String>,
    /// Basic auth password
    #[arg(long)]
    pub password: Option<String>,
}

/// Parse arguments, run one generation and return the process exit code.
pub fn run_cli<I>(args: I) -> i32
where
    I: IntoIterator<Item = String>,
{
    init_tracing();

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            return code;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(run_cli_async(cli))
}

async fn run_cli_async(cli: Cli) -> i32 {
    let result = match Settings::from_cli(&cli) {
        Ok(settings) => generate(&settings).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    }
}

/// Fetch, resolve, render and write.
pub async fn generate(settings: &Settings) -> Result<(), CliError> {
    let fetch_options = FetchOptions {
        ignore_ssl_errors: settings.ignore_ssl_errors,
        credentials: settings.credentials.as_ref(),
    };
    let document = fetch_document(&settings.source, fetch_options).await?;

    let api = resolve_value(document, &settings.options)?;
    info!(
        schemas = api.schemas.len(),
        methods = api.methods.len(),
        "Resolved OpenAPI document"
    );

    let client = Renderer::new()?.render(&api)?;
    write_output(&settings.output, &client).await?;
    info!(path = %settings.output.display(), "Wrote client");
    Ok(())
}

async fn write_output(path: &Path, content: &str) -> Result<(), CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        debug!(dir = %parent.display(), "Creating output directory");
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(path, content).await.map_err(io_error)
}

fn init_tracing() {
    // SWAGTS_LOG is either a plain level applied to both crates or a full
    // filter spec like "swagts_core=debug,reqwest=warn"
    let filter = match std::env::var("SWAGTS_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("swagts_cli={level},swagts_core={level}")
        }
        Ok(spec) => spec,
        Err(_) => "swagts_cli=info,swagts_core=warn".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
