//! Per-policy adversarial analyzers
//!
//! Every policy follows the same two-phase lifecycle. A collector observes
//! each record during the single ingestion pass, then `finish` freezes the
//! trace-wide statistics into an analyzer that answers strategy queries for
//! any number of rate pairs. Analyzers are immutable once built.

mod fcfs;
mod fq;
mod sjf;
mod sjf_inorder;
mod wsjf;
mod wsjf_inorder;

#[cfg(test)]
mod tests;

pub use fcfs::FcfsAnalyzer;
pub use fq::{FqAnalyzer, FqCollector};
pub use sjf::{SjfAnalyzer, SjfCollector};
pub use sjf_inorder::{SjfInorderAnalyzer, SjfInorderCollector};
pub use wsjf::{WsjfAnalyzer, WsjfCollector};
pub use wsjf_inorder::{WsjfInorderAnalyzer, WsjfInorderCollector};

use crate::error::{AnalyzerError, Result};
use crate::models::{AttackBounds, AttackStrategy, PacketRecord, Rates};
use crate::trace::{ingest, ingest_file, IngestSummary, TraceStatistics};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Scheduling policies with an adversarial model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    Fcfs,
    Fq,
    Sjf,
    SjfInorder,
    Wsjf,
    WsjfInorder,
}

impl Policy {
    pub const ALL: [Policy; 6] = [
        Policy::Fcfs,
        Policy::Fq,
        Policy::Sjf,
        Policy::SjfInorder,
        Policy::Wsjf,
        Policy::WsjfInorder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fcfs => "fcfs",
            Policy::Fq => "fq",
            Policy::Sjf => "sjf",
            Policy::SjfInorder => "sjf_inorder",
            Policy::Wsjf => "wsjf",
            Policy::WsjfInorder => "wsjf_inorder",
        }
    }

    /// Whether the goodput estimate for this policy is trustworthy enough to report
    pub fn has_validated_goodput(&self) -> bool {
        !matches!(self, Policy::Fq)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        Policy::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s.trim())
            .ok_or_else(|| AnalyzerError::UnsupportedPolicy(s.to_string()))
    }
}

/// Ingestion-phase state for one policy
#[derive(Debug, Clone)]
pub enum PolicyCollector {
    Fcfs,
    Fq(FqCollector),
    Sjf(SjfCollector),
    SjfInorder(SjfInorderCollector),
    Wsjf(WsjfCollector),
    WsjfInorder(WsjfInorderCollector),
}

impl PolicyCollector {
    pub fn new(policy: Policy) -> Self {
        match policy {
            Policy::Fcfs => PolicyCollector::Fcfs,
            Policy::Fq => PolicyCollector::Fq(FqCollector::default()),
            Policy::Sjf => PolicyCollector::Sjf(SjfCollector::default()),
            Policy::SjfInorder => PolicyCollector::SjfInorder(SjfInorderCollector::default()),
            Policy::Wsjf => PolicyCollector::Wsjf(WsjfCollector::default()),
            Policy::WsjfInorder => PolicyCollector::WsjfInorder(WsjfInorderCollector::default()),
        }
    }

    pub fn policy(&self) -> Policy {
        match self {
            PolicyCollector::Fcfs => Policy::Fcfs,
            PolicyCollector::Fq(_) => Policy::Fq,
            PolicyCollector::Sjf(_) => Policy::Sjf,
            PolicyCollector::SjfInorder(_) => Policy::SjfInorder,
            PolicyCollector::Wsjf(_) => Policy::Wsjf,
            PolicyCollector::WsjfInorder(_) => Policy::WsjfInorder,
        }
    }

    pub fn ingest_record(&mut self, record: &PacketRecord) {
        match self {
            PolicyCollector::Fcfs => {}
            PolicyCollector::Fq(c) => c.ingest_record(record),
            PolicyCollector::Sjf(c) => c.ingest_record(record),
            PolicyCollector::SjfInorder(c) => c.ingest_record(record),
            PolicyCollector::Wsjf(c) => c.ingest_record(record),
            PolicyCollector::WsjfInorder(c) => c.ingest_record(record),
        }
    }

    /// Freeze the collected state into an analyzer
    pub fn finish(self, stats: TraceStatistics, bounds: AttackBounds) -> Result<PolicyAnalyzer> {
        let analyzer = match self {
            PolicyCollector::Fcfs => PolicyAnalyzer::Fcfs(FcfsAnalyzer::new(stats, bounds)),
            PolicyCollector::Fq(c) => PolicyAnalyzer::Fq(c.finish(stats, bounds)),
            PolicyCollector::Sjf(c) => PolicyAnalyzer::Sjf(c.finish(stats)),
            PolicyCollector::SjfInorder(c) => PolicyAnalyzer::SjfInorder(c.finish(stats)),
            PolicyCollector::Wsjf(c) => PolicyAnalyzer::Wsjf(c.finish(stats, bounds)?),
            PolicyCollector::WsjfInorder(c) => {
                PolicyAnalyzer::WsjfInorder(c.finish(stats, bounds)?)
            }
        };
        Ok(analyzer)
    }
}

/// Query-phase analyzer for one policy
#[derive(Debug, Clone)]
pub enum PolicyAnalyzer {
    Fcfs(FcfsAnalyzer),
    Fq(FqAnalyzer),
    Sjf(SjfAnalyzer),
    SjfInorder(SjfInorderAnalyzer),
    Wsjf(WsjfAnalyzer),
    WsjfInorder(WsjfInorderAnalyzer),
}

impl PolicyAnalyzer {
    pub fn policy(&self) -> Policy {
        match self {
            PolicyAnalyzer::Fcfs(_) => Policy::Fcfs,
            PolicyAnalyzer::Fq(_) => Policy::Fq,
            PolicyAnalyzer::Sjf(_) => Policy::Sjf,
            PolicyAnalyzer::SjfInorder(_) => Policy::SjfInorder,
            PolicyAnalyzer::Wsjf(_) => Policy::Wsjf,
            PolicyAnalyzer::WsjfInorder(_) => Policy::WsjfInorder,
        }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy().name()
    }

    pub fn statistics(&self) -> &TraceStatistics {
        match self {
            PolicyAnalyzer::Fcfs(a) => a.statistics(),
            PolicyAnalyzer::Fq(a) => a.statistics(),
            PolicyAnalyzer::Sjf(a) => a.statistics(),
            PolicyAnalyzer::SjfInorder(a) => a.statistics(),
            PolicyAnalyzer::Wsjf(a) => a.statistics(),
            PolicyAnalyzer::WsjfInorder(a) => a.statistics(),
        }
    }

    /// Best attack for the given innocent and attack rates
    pub fn compute_optimal_strategy(&self, rates: &Rates) -> AttackStrategy {
        match self {
            PolicyAnalyzer::Fcfs(a) => a.compute_optimal_strategy(rates),
            PolicyAnalyzer::Fq(a) => a.compute_optimal_strategy(rates),
            PolicyAnalyzer::Sjf(a) => a.compute_optimal_strategy(rates),
            PolicyAnalyzer::SjfInorder(a) => a.compute_optimal_strategy(rates),
            PolicyAnalyzer::Wsjf(a) => a.compute_optimal_strategy(rates),
            PolicyAnalyzer::WsjfInorder(a) => a.compute_optimal_strategy(rates),
        }
    }
}

/// Analyzers for several policies built from one pass over a trace
#[derive(Debug, Clone)]
pub struct TraceAnalysis {
    pub summary: IngestSummary,
    pub analyzers: Vec<PolicyAnalyzer>,
}

impl TraceAnalysis {
    pub fn analyzer(&self, policy: Policy) -> Option<&PolicyAnalyzer> {
        self.analyzers.iter().find(|a| a.policy() == policy)
    }
}

/// Build analyzers for `policies` from a trace file
pub fn analyze_trace(
    path: &Path,
    policies: &[Policy],
    bounds: AttackBounds,
) -> Result<TraceAnalysis> {
    let mut collectors: Vec<PolicyCollector> =
        policies.iter().copied().map(PolicyCollector::new).collect();

    let summary = ingest_file(path, |record| {
        collectors.iter_mut().for_each(|c| c.ingest_record(record))
    })?;

    finish_all(summary, collectors, bounds)
}

/// Build analyzers for `policies` from any buffered reader
pub fn analyze_reader<R: BufRead>(
    reader: R,
    policies: &[Policy],
    bounds: AttackBounds,
) -> Result<TraceAnalysis> {
    let mut collectors: Vec<PolicyCollector> =
        policies.iter().copied().map(PolicyCollector::new).collect();

    let summary = ingest(reader, |record| {
        collectors.iter_mut().for_each(|c| c.ingest_record(record))
    })?;

    finish_all(summary, collectors, bounds)
}

fn finish_all(
    summary: IngestSummary,
    collectors: Vec<PolicyCollector>,
    bounds: AttackBounds,
) -> Result<TraceAnalysis> {
    let analyzers = collectors
        .into_iter()
        .map(|collector| {
            let policy = collector.policy();
            let analyzer = collector.finish(summary.statistics.clone(), bounds)?;
            debug!(policy = %policy, "Analyzer ready");
            Ok(analyzer)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TraceAnalysis { summary, analyzers })
}
