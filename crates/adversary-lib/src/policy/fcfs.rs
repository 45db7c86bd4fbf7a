//! First-come-first-served
//!
//! FCFS serves in arrival order, so only trace-wide averages matter. The
//! adversary sends minimum-size packets carrying the largest permitted job.

use crate::encoder::encode_job_size;
use crate::goodput::GoodputEstimate;
use crate::models::{AttackBounds, AttackStrategy, Rates};
use crate::solver::{innocent_work, job_size_attack_work};
use crate::trace::TraceStatistics;

#[derive(Debug, Clone)]
pub struct FcfsAnalyzer {
    stats: TraceStatistics,
    bounds: AttackBounds,
}

impl FcfsAnalyzer {
    pub fn new(stats: TraceStatistics, bounds: AttackBounds) -> Self {
        Self { stats, bounds }
    }

    pub fn statistics(&self) -> &TraceStatistics {
        &self.stats
    }

    /// Goodput when every job shares the link in arrival order
    pub fn expected_goodput(&self, rates: &Rates) -> f64 {
        let adversarial = job_size_attack_work(rates, self.bounds.max_attack_job_size_ns);
        let innocent = innocent_work(rates, &self.stats, self.stats.average_job_size());
        rates.innocent_gbps * (1.0 / (innocent + adversarial)).min(1.0)
    }

    pub fn compute_optimal_strategy(&self, rates: &Rates) -> AttackStrategy {
        let estimate = GoodputEstimate::evaluate(rates, &self.stats, self.expected_goodput(rates));
        encode_job_size(self.bounds.max_attack_job_size_ns).into_strategy(estimate)
    }
}
