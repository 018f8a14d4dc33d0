//! Analyzer setup: config loading, CLI overrides, model client creation.

use anyhow::Context;
use std::path::{Path, PathBuf};
use trafficcam_core::{Config, Trafficcam};

use super::types::OutputFormat;
use super::{AnalyzeArgs, AnalyzeContext};

/// Load config, apply overrides and build the analyzer.
///
/// The model client is created before the input is inspected, so missing
/// connection settings fail before any image is read.
pub fn setup_analyzer(args: &AnalyzeArgs, config_path: Option<&Path>) -> anyhow::Result<AnalyzeContext> {
    let mut config = Config::load_or_default(config_path)?;
    apply_overrides(&mut config, args);

    let input = args
        .input
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(|| config.input_dir());
    let format = resolve_format(args, &config)?;
    let color = config.output.color && !args.no_color;
    let output = args.output.as_deref().map(expand_path);

    let provider = config.model.provider.clone();
    let cam = Trafficcam::with_provider(config, &provider, args.model.as_deref())
        .with_context(|| {
            format!(
                "Cannot create the {provider} model client.\n\n  \
                 Hint: run `trafficcam config show` to inspect connection settings."
            )
        })?;

    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: pass a directory or set input.dir in the config file.",
            input
        );
    }

    Ok(AnalyzeContext {
        cam,
        input,
        format,
        color,
        output,
    })
}

/// Apply command-line flags on top of the loaded configuration.
pub(crate) fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) {
    if let Some(provider) = args.provider {
        config.model.provider = provider.to_string();
    }
    if let Some(interval_ms) = args.interval_ms {
        config.pacing.interval_ms = interval_ms.max(1);
    }
    if let Some(requests) = args.requests_per_interval {
        config.pacing.requests_per_interval = requests.max(1);
    }
    if let Some(retries) = args.retries {
        config.retry.attempts = retries;
    }
    if args.fail_fast {
        config.batch.fail_fast = true;
    }
    if args.case_insensitive {
        config.input.case_sensitive = false;
    }
}

fn resolve_format(args: &AnalyzeArgs, config: &Config) -> anyhow::Result<OutputFormat> {
    if let Some(format) = args.format {
        return Ok(format);
    }
    trafficcam_core::OutputFormat::parse(&config.output.format)
        .map(OutputFormat::from)
        .with_context(|| format!("Unknown output.format \"{}\"", config.output.format))
}

fn expand_path(path: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    PathBuf::from(expanded)
}
