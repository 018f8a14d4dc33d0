//! Per-image output: colored console lines or JSON Lines.

use console::Style;
use std::io::{self, Write};
use std::path::Path;
use trafficcam_core::{BatchReporter, BatchSummary, ImageReport, ReportOutcome, ReportWriter};

const SEPARATOR_WIDTH: usize = 40;

/// Prints each image's judgment as it completes.
///
/// Results render green for a healthy camera and red for a broken one.
/// Every block is flushed, so a closed stdout is noticed before the next
/// image is sent.
pub struct ConsoleRenderer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    fn style(&self, style: Style) -> Style {
        if self.color {
            style
        } else {
            style.force_styling(false)
        }
    }

    /// Print the closing totals line.
    pub fn summary(&mut self, summary: &BatchSummary) -> io::Result<()> {
        let style = if summary.failed() > 0 {
            self.style(Style::new().yellow())
        } else {
            self.style(Style::new().dim())
        };
        let line = format!(
            "Analyzed {} image(s) in {:.1}s: {} succeeded, {} failed ({} read, {} transport, {} parse)",
            summary.total,
            summary.elapsed.as_secs_f64(),
            summary.succeeded,
            summary.failed(),
            summary.read_failures,
            summary.transport_failures,
            summary.parse_failures,
        );
        writeln!(self.out, "{}", style.apply_to(line))?;
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BatchReporter for ConsoleRenderer<W> {
    fn on_start(&mut self, _index: usize, _total: usize, path: &Path) -> io::Result<()> {
        writeln!(self.out, "Processing image: {}", path.display())?;
        self.out.flush()
    }

    fn on_report(&mut self, report: &ImageReport) -> io::Result<()> {
        match &report.outcome {
            ReportOutcome::Ok { result } => {
                let style = if result.is_broken {
                    self.style(Style::new().red())
                } else {
                    self.style(Style::new().green())
                };
                writeln!(self.out, "{}", style.apply_to(format!("Is Broken : {}", result.is_broken)))?;
                writeln!(
                    self.out,
                    "{}",
                    style.apply_to(format!("Traffic Congestion Level : {}", result.congestion_level))
                )?;
                writeln!(self.out, "{}", style.apply_to(format!("Analysis : {}", result.analysis)))?;
            }
            ReportOutcome::Failed { kind, error } => {
                let style = self.style(Style::new().red());
                writeln!(self.out, "{}", style.apply_to(format!("Failed ({kind}) : {error}")))?;
            }
        }
        writeln!(self.out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        self.out.flush()
    }
}

/// Streams each report as one JSON line.
pub struct JsonlReporter<W: Write> {
    writer: ReportWriter<W>,
}

impl<W: Write> JsonlReporter<W> {
    pub fn new(writer: ReportWriter<W>) -> Self {
        Self { writer }
    }

    /// Number of reports written so far.
    pub fn items_written(&self) -> usize {
        self.writer.items_written()
    }
}

impl<W: Write> BatchReporter for JsonlReporter<W> {
    fn on_start(&mut self, index: usize, total: usize, path: &Path) -> io::Result<()> {
        tracing::debug!("[{}/{}] {:?}", index + 1, total, path);
        Ok(())
    }

    fn on_report(&mut self, report: &ImageReport) -> io::Result<()> {
        self.writer.write(report)
    }
}
