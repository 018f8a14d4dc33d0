//! Batch analysis pipeline.
//!
//! - **discovery**: Find camera images in a directory
//! - **pacing**: Token-bucket request pacing
//! - **analyzer**: Read, prompt, call and parse for a single image
//! - **batch**: Sequential driver with per-image failure isolation

pub mod analyzer;
pub mod batch;
pub mod discovery;
pub mod pacing;

// Re-exports for convenient access
pub use analyzer::{AnalysisOutcome, AnalyzerOptions, TrafficAnalyzer};
pub use batch::{BatchOptions, BatchReporter, BatchRunner};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use pacing::RateLimiter;
