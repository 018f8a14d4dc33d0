//! Core data types for camera analysis results and batch accounting.

use crate::error::FailureKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// The model's judgment for one traffic-camera image.
///
/// Every field is required when decoding a reply; see [`crate::reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraResult {
    /// True if the camera appears to be malfunctioning (distortion, noise, ...)
    pub is_broken: bool,

    /// Congestion level as the model reported it (e.g. "low", "Medium", "HEAVY")
    pub congestion_level: String,

    /// Free-text rationale from the model
    pub analysis: String,
}

impl CameraResult {
    /// Case-insensitive interpretation of [`Self::congestion_level`].
    pub fn level(&self) -> CongestionLevel {
        CongestionLevel::parse(&self.congestion_level)
    }
}

/// Known congestion levels.
///
/// The model is only asked to use these; anything else maps to `Unknown`
/// and the raw string stays on the [`CameraResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Low,
    Medium,
    Heavy,
    Unknown,
}

impl CongestionLevel {
    /// Parse a level from free text (case-insensitive, surrounding noise ignored).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" | "light" => Self::Low,
            "medium" | "moderate" => Self::Medium,
            "heavy" | "high" | "severe" => Self::Heavy,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CongestionLevel::Low => write!(f, "low"),
            CongestionLevel::Medium => write!(f, "medium"),
            CongestionLevel::Heavy => write!(f, "heavy"),
            CongestionLevel::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of processing one image.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// The reply parsed into a result
    Ok { result: CameraResult },
    /// The image failed at some stage; the batch carried on
    Failed { kind: FailureKind, error: String },
}

/// Per-image record emitted by the batch driver.
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    /// Image file that was analyzed
    pub path: PathBuf,

    #[serde(flatten)]
    pub outcome: ReportOutcome,

    /// Model identifier reported by the endpoint, if the call got that far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Round-trip latency of the successful model call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    /// Number of model calls made for this image (0 if it was never sent)
    pub attempts: u32,
}

impl ImageReport {
    /// The parsed result, if this image succeeded.
    pub fn result(&self) -> Option<&CameraResult> {
        match &self.outcome {
            ReportOutcome::Ok { result } => Some(result),
            ReportOutcome::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ReportOutcome::Ok { .. })
    }
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub read_failures: usize,
    pub transport_failures: usize,
    pub parse_failures: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Count one finished image.
    pub fn record(&mut self, outcome: &ReportOutcome) {
        self.total += 1;
        match outcome {
            ReportOutcome::Ok { .. } => self.succeeded += 1,
            ReportOutcome::Failed { kind, .. } => match kind {
                FailureKind::Read => self.read_failures += 1,
                FailureKind::Transport => self.transport_failures += 1,
                FailureKind::Parse => self.parse_failures += 1,
            },
        }
    }

    pub fn failed(&self) -> usize {
        self.read_failures + self.transport_failures + self.parse_failures
    }
}
