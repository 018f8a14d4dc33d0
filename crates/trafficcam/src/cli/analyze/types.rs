//! CLI enum types for the analyze command: output format and model provider.

use clap::ValueEnum;

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable lines per image
    Text,
    /// One JSON report per line (newline-delimited)
    Jsonl,
}

impl From<trafficcam_core::OutputFormat> for OutputFormat {
    fn from(format: trafficcam_core::OutputFormat) -> Self {
        match format {
            trafficcam_core::OutputFormat::Text => OutputFormat::Text,
            trafficcam_core::OutputFormat::JsonLines => OutputFormat::Jsonl,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Supported model providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Azure OpenAI deployment
    Azure,
    /// OpenAI API (or a compatible endpoint)
    Openai,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Azure => write!(f, "azure"),
            Provider::Openai => write!(f, "openai"),
        }
    }
}
