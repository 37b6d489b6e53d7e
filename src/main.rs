use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use dotenv::dotenv;
use log::debug;

use snapmeal::commands::{ScanPipeline, TerminalNavigator};
use snapmeal::config::AppConfig;
use snapmeal::food::capture::{FileSystemBackend, SourceKind};
use snapmeal::food::error::CaptureError;
use snapmeal::food::{ControllerPhase, LogMealClient};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    Camera,
    Library,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Scan a meal photo and show its macros", long_about = None)]
struct Args {
    /// Photo to analyze. Omit to cancel.
    image: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "library")]
    source: Source,

    /// Upload the photo as-is instead of shrinking it first
    #[arg(long)]
    no_preprocess: bool,

    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if args.no_preprocess {
        config.preprocess.enabled = false;
    }

    let client = LogMealClient::new(config.logmeal.clone()).context("Failed to build HTTP client")?;
    let navigator = Arc::new(TerminalNavigator::new(args.quantity));
    let pipeline =
        ScanPipeline::new(&config, Arc::new(client), navigator).with_progress_bar(!args.quiet);

    let kind = match args.source {
        Source::Camera => SourceKind::Camera,
        Source::Library => SourceKind::Library,
    };

    match pipeline.scan(FileSystemBackend::new(args.image), kind).await {
        Ok(phase) => Ok(ExitCode::from(exit_code(phase)?)),
        Err(e @ CaptureError::PermissionDenied(_)) => bail!("{}", e),
        Err(e) => Err(e).context("Could not obtain a photo"),
    }
}

/// Failures were already alerted through the navigator, so they only set the status.
fn exit_code(phase: Option<ControllerPhase>) -> Result<u8> {
    match phase {
        Some(ControllerPhase::Handoff(_)) => Ok(0),
        Some(ControllerPhase::Error(reason)) => {
            debug!("Analysis failed: {}", reason);
            Ok(1)
        }
        Some(phase) => bail!("Analysis ended unexpectedly: {:?}", phase),
        None => {
            println!("{}", "No photo selected.".dimmed());
            Ok(0)
        }
    }
}
