//! Shortest-job-first at flow granularity
//!
//! Whole flows are ranked by their average job size and served contiguously,
//! so the adversary's threshold admits or starves entire flows.

use crate::encoder::encode_job_size;
use crate::goodput::{scheduled_size, GoodputEstimate};
use crate::models::{AttackStrategy, PacketRecord, Rates};
use crate::profile::JobSizeProfile;
use crate::solver::solve_job_size;
use crate::trace::{FlowAggregate, FlowTable, TraceStatistics};

#[derive(Debug, Clone, Default)]
pub struct SjfInorderCollector {
    flows: FlowTable,
}

impl SjfInorderCollector {
    pub fn ingest_record(&mut self, record: &PacketRecord) {
        self.flows.record(record);
    }

    pub fn finish(self, stats: TraceStatistics) -> SjfInorderAnalyzer {
        let flows = self.flows.into_sorted_by(FlowAggregate::average_job_size);

        let total = stats.total_packets() as f64;
        let profile = JobSizeProfile::from_sorted(
            flows
                .iter()
                .map(|f| (f.average_job_size() as u64, f.total_job_size / total)),
        );

        SjfInorderAnalyzer {
            stats,
            flows,
            profile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SjfInorderAnalyzer {
    stats: TraceStatistics,
    /// Sorted ascending by average job size
    flows: Vec<FlowAggregate>,
    profile: JobSizeProfile,
}

impl SjfInorderAnalyzer {
    pub fn statistics(&self) -> &TraceStatistics {
        &self.stats
    }

    pub fn profile(&self) -> &JobSizeProfile {
        &self.profile
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn compute_optimal_strategy(&self, rates: &Rates) -> AttackStrategy {
        let threshold = solve_job_size(&self.profile, rates, &self.stats);

        let scheduled = scheduled_size(
            self.flows
                .iter()
                .map(|f| (f.average_job_size(), f.total_packet_size)),
            |job_size| threshold.admits(job_size),
        );
        let estimate = GoodputEstimate::from_scheduled_size(rates, &self.stats, scheduled);

        let job_size = threshold.limit();
        encode_job_size(job_size).into_strategy(estimate)
    }
}
