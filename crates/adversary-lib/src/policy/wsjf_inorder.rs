//! Weighted shortest-job-first at flow granularity
//!
//! Flows are ranked by their aggregate cost ratio (total job size over total
//! packet size) and served contiguously.

use crate::encoder::encode_cost_ratio;
use crate::error::Result;
use crate::goodput::{scheduled_size, GoodputEstimate};
use crate::models::{AttackBounds, AttackStrategy, PacketRecord, Rates};
use crate::profile::RatioProfile;
use crate::solver::solve_cost_ratio;
use crate::trace::{FlowAggregate, FlowTable, TraceStatistics};

#[derive(Debug, Clone, Default)]
pub struct WsjfInorderCollector {
    flows: FlowTable,
}

impl WsjfInorderCollector {
    pub fn ingest_record(&mut self, record: &PacketRecord) {
        self.flows.record(record);
    }

    pub fn finish(
        self,
        stats: TraceStatistics,
        bounds: AttackBounds,
    ) -> Result<WsjfInorderAnalyzer> {
        let flows = self.flows.into_sorted_by(FlowAggregate::average_cost_ratio);

        let total = stats.total_packets() as f64;
        let profile = RatioProfile::from_sorted(
            flows
                .iter()
                .map(|f| (f.average_cost_ratio(), f.total_job_size / total)),
        )?;

        Ok(WsjfInorderAnalyzer {
            stats,
            bounds,
            flows,
            profile,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WsjfInorderAnalyzer {
    stats: TraceStatistics,
    bounds: AttackBounds,
    /// Sorted ascending by average cost ratio
    flows: Vec<FlowAggregate>,
    profile: RatioProfile,
}

impl WsjfInorderAnalyzer {
    pub fn statistics(&self) -> &TraceStatistics {
        &self.stats
    }

    pub fn profile(&self) -> &RatioProfile {
        &self.profile
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn compute_optimal_strategy(&self, rates: &Rates) -> AttackStrategy {
        let threshold = solve_cost_ratio(&self.profile, rates, &self.stats);

        let scheduled = scheduled_size(
            self.flows
                .iter()
                .map(|f| (f.average_cost_ratio(), f.total_packet_size)),
            |ratio| threshold.admits(ratio),
        );
        let estimate = GoodputEstimate::from_scheduled_size(rates, &self.stats, scheduled);

        let ratio = threshold.limit();
        encode_cost_ratio(ratio, self.bounds.min_attack_packet_size_bits).into_strategy(estimate)
    }
}
