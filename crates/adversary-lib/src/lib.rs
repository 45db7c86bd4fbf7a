//! Adversarial goodput analysis for packet schedulers
//!
//! This crate provides the core functionality for:
//! - Streaming ingestion of simulator packet traces
//! - Per-policy cumulative cost profiles
//! - Capacity-saturation threshold search
//! - Goodput and displacement estimates
//! - Encoding an optimum as a realizable (job size, packet size) pair

pub mod config;
pub mod encoder;
pub mod error;
pub mod goodput;
pub mod libconfig;
pub mod models;
pub mod observability;
pub mod policy;
pub mod profile;
pub mod rate;
pub mod report;
pub mod solver;
pub mod trace;

pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, Result};
pub use models::*;
pub use observability::AnalysisLogger;
pub use policy::{analyze_reader, analyze_trace, Policy, PolicyAnalyzer, PolicyCollector, TraceAnalysis};
pub use rate::Rate;
pub use report::AnalysisReport;
pub use trace::{IngestSummary, TraceStatistics};
