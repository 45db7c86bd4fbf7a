//! Analyzer configuration
//!
//! Read from the simulator's template configuration, layered with
//! `ADVERSARY_*` environment overrides. `.cfg` templates are libconfig
//! documents; any other extension goes to the `config` crate's own formats.

use crate::error::{AnalyzerError, Result};
use crate::libconfig;
use crate::models::{AttackBounds, MAX_PACKET_SIZE, MIN_PACKET_SIZE};
use serde::Serialize;
use std::path::Path;

/// Key holding the adversary's maximum job size (ns)
pub const MAX_ATTACK_JOB_SIZE_KEY: &str = "application.max_attack_job_size_ns";

/// Key holding the packet size ratio strategies are rescaled to (bits)
pub const MIN_ATTACK_PACKET_SIZE_KEY: &str = "application.min_attack_packet_size_bits";

/// Default rescaling target for ratio strategies (1KiB packets)
pub const DEFAULT_MIN_ATTACK_PACKET_SIZE: u64 = 8192;

/// Settings the analyzers need from the simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzerConfig {
    pub max_attack_job_size_ns: f64,
    pub min_attack_packet_size_bits: u64,
}

impl AnalyzerConfig {
    pub fn new(max_attack_job_size_ns: f64) -> Self {
        Self {
            max_attack_job_size_ns,
            min_attack_packet_size_bits: DEFAULT_MIN_ATTACK_PACKET_SIZE,
        }
    }

    /// Load from a configuration file plus environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let builder = ::config::Config::builder();
        let builder = if libconfig::is_libconfig_path(path) {
            let text = std::fs::read_to_string(path).map_err(|source| AnalyzerError::ConfigRead {
                path: path.display().to_string(),
                source,
            })?;
            let document = serde_json::Value::Object(libconfig::from_str(&text)?);
            builder.add_source(::config::File::from_str(
                &document.to_string(),
                ::config::FileFormat::Json,
            ))
        } else {
            builder.add_source(::config::File::from(path))
        };

        let config = builder
            .add_source(::config::Environment::with_prefix("ADVERSARY").separator("__"))
            .build()?;

        Self::from_config(&config)
    }

    /// Extract analyzer settings from an already-built configuration
    pub fn from_config(config: &::config::Config) -> Result<Self> {
        let max_attack_job_size_ns = match config.get_float(MAX_ATTACK_JOB_SIZE_KEY) {
            Ok(value) => value,
            Err(::config::ConfigError::NotFound(_)) => {
                return Err(AnalyzerError::MissingConfigKey {
                    key: MAX_ATTACK_JOB_SIZE_KEY.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let min_attack_packet_size_bits = match config.get_int(MIN_ATTACK_PACKET_SIZE_KEY) {
            Ok(value) => clamp_packet_size(value),
            Err(::config::ConfigError::NotFound(_)) => DEFAULT_MIN_ATTACK_PACKET_SIZE,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            max_attack_job_size_ns,
            min_attack_packet_size_bits,
        })
    }

    pub fn bounds(&self) -> AttackBounds {
        AttackBounds {
            max_attack_job_size_ns: self.max_attack_job_size_ns,
            min_attack_packet_size_bits: self.min_attack_packet_size_bits,
        }
    }
}

fn clamp_packet_size(value: i64) -> u64 {
    let clamped = value.clamp(MIN_PACKET_SIZE as i64, MAX_PACKET_SIZE as i64) as u64;
    if clamped as i64 != value {
        tracing::warn!(
            requested = value,
            clamped = clamped,
            "Minimum attack packet size out of range"
        );
    }
    clamped
}
