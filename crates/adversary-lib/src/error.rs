//! Error types for trace analysis
//!
//! Every failure is fatal for the analysis that raised it; callers decide
//! whether to re-run with corrected input.

use thiserror::Error;

/// Errors raised while ingesting a trace or computing strategies.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed trace record on line {line}: expected at least 6 fields, got {fields}")]
    MalformedRecord { line: usize, fields: usize },

    #[error("Invalid {field} on line {line}: '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Trace contains no packet records")]
    EmptyTrace,

    #[error("Missing required configuration key '{key}'")]
    MissingConfigKey { key: String },

    #[error("Failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Libconfig(#[from] crate::libconfig::LibconfigError),

    #[error("Unsupported policy: {0}")]
    UnsupportedPolicy(String),

    #[error("Invalid rate: '{0}'")]
    InvalidRate(String),

    #[error("Cost-ratio profile needs {slots} slots (limit is {limit})")]
    ProfileTooLarge { slots: usize, limit: usize },
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, AnalyzerError>;
