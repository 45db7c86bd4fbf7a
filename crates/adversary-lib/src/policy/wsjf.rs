//! Weighted shortest-job-first
//!
//! Packets are ranked by cost ratio (job size per bit). The adversary's
//! lever is its own ratio, so the search runs over the dense ratio table and
//! the result is encoded as a (job size, packet size) fraction.

use crate::encoder::encode_cost_ratio;
use crate::error::Result;
use crate::goodput::{scheduled_size, GoodputEstimate};
use crate::models::{AttackBounds, AttackStrategy, CostSample, PacketRecord, Rates};
use crate::profile::RatioProfile;
use crate::solver::solve_cost_ratio;
use crate::trace::TraceStatistics;

#[derive(Debug, Clone, Default)]
pub struct WsjfCollector {
    samples: Vec<CostSample>,
}

impl WsjfCollector {
    pub fn ingest_record(&mut self, record: &PacketRecord) {
        self.samples.push(record.cost_sample());
    }

    pub fn finish(mut self, stats: TraceStatistics, bounds: AttackBounds) -> Result<WsjfAnalyzer> {
        self.samples
            .sort_by(|a, b| a.cost_ratio().total_cmp(&b.cost_ratio()));

        let total = stats.total_packets() as f64;
        let profile = RatioProfile::from_sorted(
            self.samples
                .iter()
                .map(|s| (s.cost_ratio(), s.job_size / total)),
        )?;

        Ok(WsjfAnalyzer {
            stats,
            bounds,
            samples: self.samples,
            profile,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WsjfAnalyzer {
    stats: TraceStatistics,
    bounds: AttackBounds,
    /// Sorted ascending by cost ratio
    samples: Vec<CostSample>,
    profile: RatioProfile,
}

impl WsjfAnalyzer {
    pub fn statistics(&self) -> &TraceStatistics {
        &self.stats
    }

    pub fn profile(&self) -> &RatioProfile {
        &self.profile
    }

    pub fn compute_optimal_strategy(&self, rates: &Rates) -> AttackStrategy {
        let threshold = solve_cost_ratio(&self.profile, rates, &self.stats);

        let scheduled = scheduled_size(
            self.samples.iter().map(|s| (s.cost_ratio(), s.packet_size)),
            |ratio| threshold.admits(ratio),
        );
        let estimate = GoodputEstimate::from_scheduled_size(rates, &self.stats, scheduled);

        let ratio = threshold.limit();
        encode_cost_ratio(ratio, self.bounds.min_attack_packet_size_bits).into_strategy(estimate)
    }
}
