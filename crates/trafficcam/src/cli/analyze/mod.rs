//! The `trafficcam analyze` command for analyzing camera images.

mod render;
mod setup;
pub mod types;

pub use types::{OutputFormat, Provider};

use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use trafficcam_core::{BatchSummary, FileDiscovery, ReportWriter, Trafficcam};

use render::{ConsoleRenderer, JsonlReporter};
use setup::setup_analyzer;

/// Arguments for the `analyze` command.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Image file or directory to analyze (defaults to input.dir from config)
    pub input: Option<PathBuf>,

    /// Model provider
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (openai) or deployment name (azure)
    #[arg(long)]
    pub model: Option<String>,

    /// Minimum spacing between model requests, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Requests allowed per interval
    #[arg(long)]
    pub requests_per_interval: Option<u32>,

    /// Retries for transient model failures (0 disables)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Stop at the first failed image
    #[arg(long)]
    pub fail_fast: bool,

    /// Match file extensions case-insensitively (e.g. also pick up .JPG)
    #[arg(long)]
    pub case_insensitive: bool,

    /// Output format (defaults to output.format from config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file for jsonl reports (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Analysis context assembled by setup_analyzer().
pub(crate) struct AnalyzeContext {
    pub cam: Trafficcam,
    pub input: PathBuf,
    pub format: OutputFormat,
    pub color: bool,
    pub output: Option<PathBuf>,
}

/// Execute the analyze command.
///
/// `config_path` is the global `--config` override, if any.
pub async fn execute(args: AnalyzeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut ctx = setup_analyzer(&args, config_path)?;

    let files = ctx.cam.discover(&ctx.input);
    if files.is_empty() {
        tracing::warn!("No matching image files found at {:?}", ctx.input);
        return Ok(());
    }
    tracing::info!(
        "Found {} image(s) to analyze ({:.1} MB)",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / (1024.0 * 1024.0)
    );

    match ctx.format {
        OutputFormat::Text => {
            if ctx.output.is_some() {
                tracing::warn!("--output only applies to jsonl; printing to stdout");
            }
            let mut renderer = ConsoleRenderer::new(io::stdout(), ctx.color);
            let summary = ctx.cam.run(&files, &mut renderer).await?;
            renderer.summary(&summary)?;
        }
        OutputFormat::Jsonl => {
            let writer: Box<dyn Write> = match &ctx.output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(io::stdout()),
            };
            let mut reporter = JsonlReporter::new(ReportWriter::new(writer));
            let summary = ctx.cam.run(&files, &mut reporter).await?;
            log_summary(&summary);
            if let Some(path) = &ctx.output {
                tracing::info!("Wrote {} report(s) to {:?}", reporter.items_written(), path);
            }
        }
    }

    Ok(())
}

fn log_summary(summary: &BatchSummary) {
    tracing::info!(
        "Analyzed {} image(s) in {:.1}s: {} succeeded, {} failed",
        summary.total,
        summary.elapsed.as_secs_f64(),
        summary.succeeded,
        summary.failed()
    );
}
