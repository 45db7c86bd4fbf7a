//! Shortest-job-first
//!
//! Packets are served in ascending job size. The adversary picks the largest
//! job size that still keeps innocent plus attack work under capacity; every
//! innocent packet with a larger job is starved.

use crate::encoder::encode_job_size;
use crate::goodput::{scheduled_size, GoodputEstimate};
use crate::models::{AttackStrategy, CostSample, PacketRecord, Rates};
use crate::profile::JobSizeProfile;
use crate::solver::solve_job_size;
use crate::trace::TraceStatistics;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct SjfCollector {
    samples: Vec<CostSample>,
    /// Integer job size -> packet count
    histogram: BTreeMap<u64, u64>,
}

impl SjfCollector {
    pub fn ingest_record(&mut self, record: &PacketRecord) {
        self.samples.push(record.cost_sample());
        *self.histogram.entry(record.job_size as u64).or_insert(0) += 1;
    }

    pub fn finish(mut self, stats: TraceStatistics) -> SjfAnalyzer {
        self.samples.sort_by(|a, b| a.job_size.total_cmp(&b.job_size));

        let total = stats.total_packets() as f64;
        let profile = JobSizeProfile::from_sorted(
            self.histogram
                .iter()
                .map(|(&job_size, &count)| (job_size, (count as f64 / total) * job_size as f64)),
        );

        SjfAnalyzer {
            stats,
            samples: self.samples,
            profile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SjfAnalyzer {
    stats: TraceStatistics,
    /// Sorted ascending by job size
    samples: Vec<CostSample>,
    profile: JobSizeProfile,
}

impl SjfAnalyzer {
    pub fn statistics(&self) -> &TraceStatistics {
        &self.stats
    }

    pub fn profile(&self) -> &JobSizeProfile {
        &self.profile
    }

    pub fn compute_optimal_strategy(&self, rates: &Rates) -> AttackStrategy {
        let threshold = solve_job_size(&self.profile, rates, &self.stats);

        let scheduled = scheduled_size(
            self.samples.iter().map(|s| (s.job_size, s.packet_size)),
            |job_size| threshold.admits(job_size),
        );
        let estimate = GoodputEstimate::from_scheduled_size(rates, &self.stats, scheduled);

        let job_size = threshold.limit();
        encode_job_size(job_size).into_strategy(estimate)
    }
}
