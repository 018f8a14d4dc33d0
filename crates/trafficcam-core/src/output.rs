//! Machine-readable report output.
//!
//! Per-image reports are written as JSON Lines, one object per image, as
//! soon as each image finishes.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::ImageReport;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable console lines
    Text,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "console" => Some(Self::Text),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Streams [`ImageReport`]s as JSON Lines.
pub struct ReportWriter<W: Write> {
    writer: W,
    items_written: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            items_written: 0,
        }
    }

    /// Write one report and flush, so partial batches are never lost.
    pub fn write(&mut self, report: &ImageReport) -> io::Result<()> {
        write_line(&mut self.writer, report)?;
        self.writer.flush()?;
        self.items_written += 1;
        Ok(())
    }

    /// Get the number of reports written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn write_line<W: Write, T: Serialize>(writer: &mut W, item: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, item).map_err(io::Error::other)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::types::{CameraResult, ReportOutcome};
    use std::path::PathBuf;

    fn report(name: &str, outcome: ReportOutcome) -> ImageReport {
        ImageReport {
            path: PathBuf::from(name),
            outcome,
            model: Some("gpt-4o".to_string()),
            latency_ms: Some(840),
            attempts: 1,
        }
    }

    #[test]
    fn test_write_jsonl() {
        let mut writer = ReportWriter::new(Vec::new());

        writer
            .write(&report(
                "a.jpg",
                ReportOutcome::Ok {
                    result: CameraResult {
                        is_broken: false,
                        congestion_level: "heavy".to_string(),
                        analysis: "queue to the horizon".to_string(),
                    },
                },
            ))
            .unwrap();
        writer
            .write(&report(
                "b.jpg",
                ReportOutcome::Failed {
                    kind: FailureKind::Parse,
                    error: "missing field `analysis`".to_string(),
                },
            ))
            .unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["result"]["congestion_level"], "heavy");
        assert_eq!(lines[1]["status"], "failed");
        assert_eq!(lines[1]["kind"], "parse");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("xml"), None);
    }
}
