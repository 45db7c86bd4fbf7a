//! Machine-readable record of an analysis run

use crate::models::AttackStrategy;
use crate::policy::{Policy, TraceAnalysis};
use crate::rate::Rate;
use crate::trace::TraceStatistics;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;

/// Where the strategies came from
#[derive(Debug, Clone, Serialize)]
pub struct TraceSummary {
    pub path: String,
    pub records: u64,
    pub sha256: String,
    pub statistics: TraceStatistics,
}

/// One (policy, innocent rate, attack rate) answer
#[derive(Debug, Clone, Serialize)]
pub struct StrategyRecord {
    pub policy: Policy,
    pub innocent_rate: Rate,
    pub attack_rate: Rate,
    pub strategy: AttackStrategy,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// RFC 3339, UTC
    pub generated_at: String,
    pub trace: TraceSummary,
    pub runs: Vec<StrategyRecord>,
}

impl AnalysisReport {
    pub fn new(trace_path: &Path, analysis: &TraceAnalysis) -> Self {
        Self::at(Utc::now(), trace_path, analysis)
    }

    pub fn at(now: DateTime<Utc>, trace_path: &Path, analysis: &TraceAnalysis) -> Self {
        let statistics = analysis.summary.statistics.clone();
        Self {
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            trace: TraceSummary {
                path: trace_path.display().to_string(),
                records: statistics.total_packets(),
                sha256: analysis.summary.sha256.clone(),
                statistics,
            },
            runs: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        policy: Policy,
        innocent_rate: Rate,
        attack_rate: Rate,
        strategy: AttackStrategy,
    ) {
        self.runs.push(StrategyRecord {
            policy,
            innocent_rate,
            attack_rate,
            strategy,
        });
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
