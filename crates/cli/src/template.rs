//! Simulator configuration templating
//!
//! The simulator only reads libconfig, so generated configurations are
//! always written as `.cfg` documents. Templates may be libconfig or any
//! format the `config` crate understands.

use adversary_lib::libconfig;
use adversary_lib::{AttackStrategy, Policy, Rate};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Flows the synthetic attack traffic is spread over
const ATTACK_NUM_FLOWS: u64 = 1_000_000;

/// Per-job values substituted into the template
pub struct JobParameters<'a> {
    pub policy: Policy,
    pub innocent_rate: Rate,
    pub average_packet_size_bits: u64,
    pub attack_rate: Rate,
    pub strategy: &'a AttackStrategy,
}

#[derive(Debug, Clone)]
pub struct SimulationTemplate {
    root: Map<String, Value>,
}

impl SimulationTemplate {
    pub fn load(path: &Path) -> Result<Self> {
        if libconfig::is_libconfig_path(path) {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            let root = libconfig::from_str(&text)
                .with_context(|| format!("Failed to parse template {}", path.display()))?;
            return Ok(Self { root });
        }

        let root = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("Failed to read template {}", path.display()))?
            .try_deserialize::<Map<String, Value>>()
            .context("Template is not a key/value document")?;

        Ok(Self { root })
    }

    /// Template with one job's values substituted
    pub fn render(&self, job: &JobParameters<'_>) -> Map<String, Value> {
        let mut root = self.root.clone();
        root.insert("policy".into(), Value::from(job.policy.name()));

        let mut innocent = take_section(&mut root, "innocent_traffic");
        innocent.insert("rate_bps".into(), Value::from(job.innocent_rate.bps()));
        innocent.insert(
            "average_packet_size_bits".into(),
            Value::from(job.average_packet_size_bits),
        );
        root.insert("innocent_traffic".into(), Value::Object(innocent));

        let mut attack = take_section(&mut root, "attack_traffic");
        attack.insert("rate_bps".into(), Value::from(job.attack_rate.bps()));
        attack.insert("type".into(), Value::from("synthetic"));
        attack.insert("num_flows".into(), Value::from(ATTACK_NUM_FLOWS));
        attack.insert(
            "packet_size_bits".into(),
            Value::from(job.strategy.packet_size_bits),
        );
        attack.insert(
            "job_size_ns".into(),
            Value::from(job.strategy.estimated_job_size_ns),
        );
        root.insert("attack_traffic".into(), Value::Object(attack));

        root
    }

    /// Write one job's configuration as a libconfig document
    pub fn write(&self, job: &JobParameters<'_>, path: &Path) -> Result<()> {
        let content = libconfig::to_string(&self.render(job))
            .context("Failed to serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Remove `key` from `root`, yielding it as an object (empty if absent or not a table)
fn take_section(root: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match root.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
