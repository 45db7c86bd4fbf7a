//! Capacity threshold search
//!
//! Walks a cumulative-cost profile in ascending order and stops at the first
//! threshold where innocent plus adversarial work saturates the scheduler
//! (normalized work >= 1). The accepted threshold is the last feasible one.

use crate::models::{Rates, MIN_PACKET_SIZE};
use crate::profile::{slot_ratio, JobSizeProfile, RatioProfile};
use crate::trace::TraceStatistics;

/// Normalized work at which the scheduler is fully utilized
pub const SATURATION: f64 = 1.0;

/// Outcome of a threshold search
///
/// Both variants carry the adversary's operating point, which always
/// satisfies the saturation inequality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Capacity saturates above `limit`; only items at or below it survive
    Saturated { limit: f64 },
    /// The profile was exhausted without saturating; every item survives
    Exhausted { limit: f64 },
}

impl Threshold {
    pub fn admits(&self, value: f64) -> bool {
        match self {
            Threshold::Saturated { limit } => value <= *limit,
            Threshold::Exhausted { .. } => true,
        }
    }

    /// The adversary's operating point
    pub fn limit(&self) -> f64 {
        match self {
            Threshold::Saturated { limit } | Threshold::Exhausted { limit } => *limit,
        }
    }
}

/// Innocent work at a given cumulative expectation
pub fn innocent_work(rates: &Rates, stats: &TraceStatistics, expectation: f64) -> f64 {
    (rates.innocent_gbps / stats.average_packet_size() as f64) * expectation
}

/// Adversarial work when every attack packet is minimum-sized and carries `job_size`
pub fn job_size_attack_work(rates: &Rates, job_size: f64) -> f64 {
    (rates.attack_gbps / MIN_PACKET_SIZE as f64) * job_size
}

/// Adversarial work at a given cost ratio
pub fn cost_ratio_attack_work(rates: &Rates, ratio: f64) -> f64 {
    rates.attack_gbps * ratio
}

/// Threshold search over integer job sizes (SJF family)
///
/// At key `j` the adversary sends jobs of size `j - 1`, just small enough to
/// be served ahead of every innocent job of size `j`. An exhausted scan
/// settles on the largest innocent job size.
pub fn solve_job_size(
    profile: &JobSizeProfile,
    rates: &Rates,
    stats: &TraceStatistics,
) -> Threshold {
    for &(job_size, expectation) in profile.points() {
        let candidate = job_size.saturating_sub(1) as f64;
        let work = innocent_work(rates, stats, expectation) + job_size_attack_work(rates, candidate);
        if work >= SATURATION {
            return Threshold::Saturated { limit: candidate };
        }
    }
    Threshold::Exhausted {
        limit: stats.maximum_job_size(),
    }
}

/// Threshold search over the scaled cost-ratio table (WSJF family)
///
/// Every slot before the first violation is feasible, so an exhausted scan
/// settles on the ratio of the last slot.
pub fn solve_cost_ratio(
    profile: &RatioProfile,
    rates: &Rates,
    stats: &TraceStatistics,
) -> Threshold {
    for (slot, &expectation) in profile.slots().iter().enumerate() {
        let ratio = slot_ratio(slot);
        let work = innocent_work(rates, stats, expectation) + cost_ratio_attack_work(rates, ratio);
        if work >= SATURATION {
            return Threshold::Saturated {
                limit: slot_ratio(slot.saturating_sub(1)),
            };
        }
    }
    Threshold::Exhausted {
        limit: profile.max_ratio(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PacketRecord;
    use crate::trace::TraceStatsBuilder;

    fn stats(packets: &[(u64, f64)]) -> TraceStatistics {
        let mut builder = TraceStatsBuilder::new();
        for &(packet_size, job_size) in packets {
            builder.observe(&PacketRecord {
                arrival_time: 0.0,
                departure_time: 0.0,
                flow_id: "f".to_string(),
                class_tag: "innocent".to_string(),
                packet_size,
                job_size,
            });
        }
        builder.finish().unwrap()
    }

    #[test]
    fn test_threshold_admission() {
        let saturated = Threshold::Saturated { limit: 99.0 };
        assert!(saturated.admits(99.0));
        assert!(!saturated.admits(99.5));
        assert_eq!(saturated.limit(), 99.0);

        let exhausted = Threshold::Exhausted { limit: 200.0 };
        assert!(exhausted.admits(f64::MAX));
        assert_eq!(exhausted.limit(), 200.0);
    }

    #[test]
    fn test_job_size_no_attack_settles_on_largest_job() {
        let stats = stats(&[(512, 100.0), (1024, 200.0)]);
        let profile = JobSizeProfile::from_sorted(vec![(100, 50.0), (200, 100.0)]);
        let threshold = solve_job_size(&profile, &Rates::new(1.0, 0.0), &stats);
        assert_eq!(threshold, Threshold::Exhausted { limit: 200.0 });
    }

    #[test]
    fn test_job_size_saturates_at_first_key() {
        let stats = stats(&[(512, 100.0), (1024, 200.0)]);
        let profile = JobSizeProfile::from_sorted(vec![(100, 50.0), (200, 100.0)]);
        // 100 Gbps of 99ns jobs in 512-bit packets is far beyond capacity
        let threshold = solve_job_size(&profile, &Rates::new(1.0, 100.0), &stats);
        assert_eq!(threshold, Threshold::Saturated { limit: 99.0 });
    }

    #[test]
    fn test_job_size_saturates_at_second_key() {
        let stats = stats(&[(512, 100.0), (1024, 200.0)]);
        let profile = JobSizeProfile::from_sorted(vec![(100, 50.0), (200, 100.0)]);
        // Key 100: 3/512 * 99 + 50/768 < 1; key 200: 3/512 * 199 alone exceeds 1
        let threshold = solve_job_size(&profile, &Rates::new(1.0, 3.0), &stats);
        assert_eq!(threshold, Threshold::Saturated { limit: 199.0 });
    }

    #[test]
    fn test_cost_ratio_saturates() {
        let stats = stats(&[(1024, 256.0)]);
        let profile = RatioProfile::from_sorted(vec![(0.25, 256.0)]).unwrap();
        // r_A * slot / 4096 >= 1 first at slot 410 for r_A = 10
        let threshold = solve_cost_ratio(&profile, &Rates::new(0.0, 10.0), &stats);
        assert_eq!(threshold, Threshold::Saturated { limit: 409.0 / 4096.0 });
    }

    #[test]
    fn test_cost_ratio_exhausted_settles_on_last_slot() {
        let stats = stats(&[(1024, 256.0)]);
        let profile = RatioProfile::from_sorted(vec![(0.25, 256.0)]).unwrap();
        let threshold = solve_cost_ratio(&profile, &Rates::new(1.0, 0.0), &stats);
        assert_eq!(threshold, Threshold::Exhausted { limit: 0.25 });
    }

    #[test]
    fn test_cost_ratio_exhausted_limit_is_feasible() {
        // Two packets at ratios 100/1024 and 200/1024; 2.5 Gbps of attack at
        // the last slot still fits
        let stats = stats(&[(1024, 100.0), (1024, 200.0)]);
        let profile =
            RatioProfile::from_sorted(vec![(100.0 / 1024.0, 50.0), (200.0 / 1024.0, 100.0)])
                .unwrap();
        let rates = Rates::new(1.0, 2.5);
        let threshold = solve_cost_ratio(&profile, &rates, &stats);

        assert_eq!(threshold, Threshold::Exhausted { limit: 800.0 / 4096.0 });
        let work = innocent_work(&rates, &stats, *profile.slots().last().unwrap())
            + cost_ratio_attack_work(&rates, threshold.limit());
        assert!(work < SATURATION);
    }
}
