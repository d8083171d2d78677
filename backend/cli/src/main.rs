mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};

use smartparse_config::{config_dir, config_file_path, load_and_prepare};
use smartparse_core::{RawFileDescriptor, SmartParseError};
use smartparse_logging::{TracingReporter, init_logger};
use smartparse_pipeline::SmartParser;

#[derive(Parser)]
#[command(name = "smartparse")]
#[command(about = "SmartParse: batch document parsing with structured export")]
#[command(version)]
struct Cli {
    /// Config file (defaults to config.yaml in the SmartParse config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write JSON logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long)]
    level: Option<String>,

    /// Documents to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Only print rows matching this query
    #[arg(long)]
    search: Option<String>,

    /// Export format, may be repeated
    #[arg(long = "export")]
    exports: Vec<String>,

    /// Directory for exported files
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip simulated stage and export delays
    #[arg(long)]
    instant: bool,

    /// Print rows as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path(&config_dir()),
    };
    let mut config = load_and_prepare(&config_path)
        .await
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if cli.instant {
        config = config.without_delays();
    }

    let level = cli.level.clone().unwrap_or_else(|| config.log_level());
    let log_dir = cli.log_dir.clone().or_else(|| config.log_dir());
    init_logger(log_dir.as_deref(), &level)?;

    info!(config = %config_path.display(), files = cli.files.len(), "Starting SmartParse");

    let mut parser = SmartParser::with_config(Arc::new(TracingReporter::new()), &config);

    let mut descriptors = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        descriptors.push(describe(path).await?);
    }
    parser.add_files(descriptors);

    let cancel = parser.cancellation_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current stage");
            cancel.cancel();
        }
    });

    let summary = match parser.start_run().await {
        Ok(summary) => summary,
        Err(SmartParseError::Cancelled) => {
            eprintln!("Parsing cancelled");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let rows = match &cli.search {
        Some(query) => parser.search(query),
        None => parser.results().to_vec(),
    };
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", output::render_results(&rows, output::supports_color()));
        print!("{}", output::render_summary(&summary, &parser.stats()));
    }

    if !cli.exports.is_empty() {
        let out_dir = cli
            .out
            .clone()
            .or_else(|| config.export_output_dir())
            .unwrap_or_else(|| PathBuf::from("."));
        for format in &cli.exports {
            let artifact = parser.export(format).await?;
            let path = artifact.write_to(&out_dir).await?;
            println!("Exported {} to {}", artifact.label, path.display());
        }
    }

    Ok(())
}

async fn describe(path: &Path) -> Result<RawFileDescriptor> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(RawFileDescriptor::new(name, metadata.len()).with_handle(path))
}
