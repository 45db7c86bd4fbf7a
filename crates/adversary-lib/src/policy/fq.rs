//! Fair queueing
//!
//! Each of the k innocent flows gets a 1/k share of capacity, diluted by the
//! adversary's work. The estimate has not been validated against simulation.

use crate::encoder::encode_job_size;
use crate::goodput::GoodputEstimate;
use crate::models::{AttackBounds, AttackStrategy, PacketRecord, Rates};
use crate::solver::job_size_attack_work;
use crate::trace::TraceStatistics;
use std::collections::BTreeSet;

/// Distinct flow ids seen during ingestion
#[derive(Debug, Clone, Default)]
pub struct FqCollector {
    flows: BTreeSet<String>,
}

impl FqCollector {
    pub fn ingest_record(&mut self, record: &PacketRecord) {
        if !self.flows.contains(&record.flow_id) {
            self.flows.insert(record.flow_id.clone());
        }
    }

    pub fn finish(self, stats: TraceStatistics, bounds: AttackBounds) -> FqAnalyzer {
        FqAnalyzer {
            stats,
            bounds,
            flows: self.flows.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FqAnalyzer {
    stats: TraceStatistics,
    bounds: AttackBounds,
    flows: usize,
}

impl FqAnalyzer {
    pub fn statistics(&self) -> &TraceStatistics {
        &self.stats
    }

    /// Number of distinct innocent flows (k)
    pub fn flow_count(&self) -> usize {
        self.flows
    }

    pub fn compute_optimal_strategy(&self, rates: &Rates) -> AttackStrategy {
        let adversarial = job_size_attack_work(rates, self.bounds.max_attack_job_size_ns);
        let k = self.flows as f64;
        let goodput = rates.innocent_gbps.min((k * self.stats.r_max()) / (adversarial + k));

        let estimate = GoodputEstimate::evaluate(rates, &self.stats, goodput);
        encode_job_size(self.bounds.max_attack_job_size_ns).into_strategy(estimate)
    }
}
