//! Sequential batch driver.
//!
//! Images are analyzed strictly one after another. Each image's outcome is
//! reported as soon as it is known; by default a failed image is counted and
//! the batch moves on, while fail-fast mode stops at the first failure.
//! A reporter that can no longer write stops the batch before the next
//! image is sent.

use std::io;
use std::path::Path;
use std::time::Instant;

use crate::error::{AnalysisError, TrafficError};
use crate::types::{BatchSummary, ImageReport, ReportOutcome};

use super::analyzer::TrafficAnalyzer;
use super::discovery::DiscoveredFile;

/// Receives progress from [`BatchRunner::run`].
///
/// An error from either method aborts the batch with [`TrafficError::Io`].
pub trait BatchReporter {
    /// Called before an image is read.
    fn on_start(&mut self, index: usize, total: usize, path: &Path) -> io::Result<()>;

    /// Called once per image with its outcome.
    fn on_report(&mut self, report: &ImageReport) -> io::Result<()>;
}

/// Batch behavior switches.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Stop at the first failed image and return its error
    pub fail_fast: bool,
}

/// Drives a [`TrafficAnalyzer`] over a list of files.
pub struct BatchRunner {
    analyzer: TrafficAnalyzer,
    options: BatchOptions,
}

impl BatchRunner {
    pub fn new(analyzer: TrafficAnalyzer, options: BatchOptions) -> Self {
        Self { analyzer, options }
    }

    /// Analyze every file in order.
    ///
    /// Returns the batch totals. In fail-fast mode the first failure is
    /// reported to `reporter` and then returned as an error; the remaining
    /// files are never read. The same happens when `reporter` fails.
    pub async fn run<R>(
        &mut self,
        files: &[DiscoveredFile],
        reporter: &mut R,
    ) -> Result<BatchSummary, TrafficError>
    where
        R: BatchReporter + ?Sized,
    {
        let start = Instant::now();
        let total = files.len();
        let mut summary = BatchSummary::default();

        tracing::debug!(
            "Analyzing {total} image(s) with the {} client",
            self.analyzer.client_name()
        );

        for (index, file) in files.iter().enumerate() {
            reporter
                .on_start(index, total, &file.path)
                .map_err(|e| report_failed(e, total - index))?;

            let outcome = self.analyzer.analyze(&file.path).await;
            let (report_outcome, error) = match outcome.result {
                Ok(result) => (ReportOutcome::Ok { result }, None),
                Err(e) => (
                    ReportOutcome::Failed {
                        kind: e.kind(),
                        error: e.to_string(),
                    },
                    Some(e),
                ),
            };

            let report = ImageReport {
                path: file.path.clone(),
                outcome: report_outcome,
                model: outcome.model,
                latency_ms: outcome.latency_ms,
                attempts: outcome.attempts,
            };
            summary.record(&report.outcome);
            reporter
                .on_report(&report)
                .map_err(|e| report_failed(e, total - index - 1))?;

            if let Some(error) = error {
                tracing::error!("Failed: {:?} - {}", file.path, error);
                if self.options.fail_fast {
                    log_abort(&error, total - index - 1);
                    return Err(error.into());
                }
            }
        }

        summary.elapsed = start.elapsed();
        if summary.failed() > 0 {
            tracing::warn!(
                "Batch finished: {} succeeded, {} failed",
                summary.succeeded,
                summary.failed()
            );
        } else {
            tracing::info!("Batch finished: {} succeeded", summary.succeeded);
        }
        Ok(summary)
    }
}

fn report_failed(error: io::Error, remaining: usize) -> TrafficError {
    tracing::error!("Cannot write results ({error}), {remaining} image(s) not processed");
    TrafficError::Io(error)
}

fn log_abort(error: &AnalysisError, remaining: usize) {
    if remaining > 0 {
        tracing::warn!(
            "Stopping batch after {} failure, {remaining} image(s) not processed",
            error.kind()
        );
    }
}
