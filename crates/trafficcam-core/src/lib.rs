//! trafficcam core - traffic-camera triage through a hosted vision model.
//!
//! Each camera image is sent to a chat-completions model together with fixed
//! instructions; the reply is decoded into a [`CameraResult`] saying whether
//! the camera looks broken and how congested the road is.
//!
//! # Architecture
//!
//! ```text
//! Discover → (per image) Read → Pace → Model call (retry) → Parse → Report
//! ```
//!
//! Images are processed strictly in sequence. A failed image is reported and
//! counted; the batch carries on unless fail-fast is enabled.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trafficcam_core::{Config, Trafficcam};
//!
//! #[tokio::main]
//! async fn main() -> trafficcam_core::Result<()> {
//!     let config = Config::load()?;
//!     let mut cam = Trafficcam::new(config)?;
//!     let files = cam.discover(std::path::Path::new("Images"));
//!     let summary = cam.run(&files, &mut my_reporter).await?;
//!     println!("{} ok, {} failed", summary.succeeded, summary.failed());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod reply;
pub mod types;

use std::path::Path;

// Re-exports for convenient access
pub use config::Config;
pub use error::{AnalysisError, AnalysisResult, ConfigError, FailureKind, Result, TrafficError};
pub use llm::{ModelClient, ModelClientFactory};
pub use output::{OutputFormat, ReportWriter};
pub use pipeline::{
    AnalyzerOptions, BatchOptions, BatchReporter, BatchRunner, DiscoveredFile, FileDiscovery,
    RateLimiter, TrafficAnalyzer,
};
pub use reply::parse_camera_result;
pub use types::{BatchSummary, CameraResult, CongestionLevel, ImageReport, ReportOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fully wired batch analyzer: discovery, model client, pacer and driver.
pub struct Trafficcam {
    discovery: FileDiscovery,
    runner: BatchRunner,
}

impl Trafficcam {
    /// Build from configuration using the configured model provider.
    ///
    /// Fails with a configuration error when connection values are missing,
    /// before any image is touched.
    pub fn new(config: Config) -> Result<Self> {
        let provider = config.model.provider.clone();
        Self::with_provider(config, &provider, None)
    }

    /// Build with an explicit provider and optional model/deployment override.
    pub fn with_provider(
        config: Config,
        provider: &str,
        model_override: Option<&str>,
    ) -> Result<Self> {
        let client = ModelClientFactory::create(provider, &config.model, model_override)?;
        tracing::debug!("Initializing trafficcam v{} ({provider})", VERSION);
        Ok(Self::with_client(config, client))
    }

    /// Build around an existing model client.
    pub fn with_client(config: Config, client: Box<dyn ModelClient>) -> Self {
        let analyzer = TrafficAnalyzer::new(
            client,
            RateLimiter::from_config(&config.pacing),
            AnalyzerOptions::from_config(&config),
        );
        let runner = BatchRunner::new(
            analyzer,
            BatchOptions {
                fail_fast: config.batch.fail_fast,
            },
        );
        Self {
            discovery: FileDiscovery::new(config.input),
            runner,
        }
    }

    /// Find images to analyze at `path` (a directory or a single file).
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }

    /// Analyze `files` in order, reporting each outcome.
    pub async fn run<R>(&mut self, files: &[DiscoveredFile], reporter: &mut R) -> Result<BatchSummary>
    where
        R: BatchReporter + ?Sized,
    {
        self.runner.run(files, reporter).await
    }
}
