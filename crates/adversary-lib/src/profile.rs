//! Cumulative-cost profiles
//!
//! A profile maps a cost threshold to the expected job-size mass (per innocent
//! packet) of everything a scheduler would serve ahead of an adversarial job
//! at that threshold. Job-size policies key the profile by integer job size;
//! ratio policies use a dense lookup table over `ratio * RATIO_SCALE`.

use crate::error::{AnalyzerError, Result};

/// Ratio resolution of the dense lookup table (slots per unit ratio)
///
/// Larger values give a finer threshold search at the cost of a longer table.
pub const RATIO_SCALE: f64 = 4096.0;

/// Upper bound on lookup-table length
///
/// 2^24 f64 slots is 128MiB and covers cost ratios up to
/// `MAX_RATIO_SLOTS / RATIO_SCALE` = 4096 ns/bit. Memory scales with both
/// constants: lowering `RATIO_SCALE` admits larger ratios in the same table
/// at a coarser threshold search.
pub const MAX_RATIO_SLOTS: usize = 1 << 24;

/// Table slot for a cost ratio
pub fn ratio_slot(ratio: f64) -> usize {
    (ratio * RATIO_SCALE).round() as usize
}

/// Cost ratio represented by a table slot
pub fn slot_ratio(slot: usize) -> f64 {
    slot as f64 / RATIO_SCALE
}

/// Sparse profile over integer job sizes, ascending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSizeProfile {
    points: Vec<(u64, f64)>,
}

impl JobSizeProfile {
    /// Build from `(job_size_key, contribution)` pairs already sorted by key.
    /// Repeated keys fold into a single point holding the running total.
    pub fn from_sorted<I>(contributions: I) -> Self
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        let mut points: Vec<(u64, f64)> = Vec::new();
        let mut cumulative = 0.0;

        for (key, contribution) in contributions {
            cumulative += contribution;
            match points.last_mut() {
                Some((last_key, value)) if *last_key == key => *value = cumulative,
                _ => points.push((key, cumulative)),
            }
        }

        Self { points }
    }

    pub fn points(&self) -> &[(u64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total expected job size over the whole trace
    pub fn total(&self) -> f64 {
        self.points.last().map(|(_, v)| *v).unwrap_or(0.0)
    }
}

/// Dense profile over scaled cost ratios
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatioProfile {
    slots: Vec<f64>,
}

impl RatioProfile {
    /// Build from `(cost_ratio, contribution)` pairs sorted by ratio.
    ///
    /// Slots with no item of their own carry the value of the nearest
    /// populated slot below them.
    pub fn from_sorted<I>(contributions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut slots: Vec<f64> = Vec::new();
        let mut cumulative = 0.0;

        for (ratio, contribution) in contributions {
            let slot = ratio_slot(ratio);
            if slot >= MAX_RATIO_SLOTS {
                return Err(AnalyzerError::ProfileTooLarge {
                    slots: slot.saturating_add(1),
                    limit: MAX_RATIO_SLOTS,
                });
            }

            if slots.len() < slot {
                slots.resize(slot, cumulative);
            }
            cumulative += contribution;
            if slots.len() == slot {
                slots.push(cumulative);
            } else if let Some(last) = slots.last_mut() {
                *last = cumulative;
            }
        }

        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[f64] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Largest ratio the table covers
    pub fn max_ratio(&self) -> f64 {
        slot_ratio(self.slots.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_non_decreasing(values: &[f64]) -> bool {
        values.windows(2).all(|w| w[0] <= w[1])
    }

    #[test]
    fn test_job_size_profile_folds_repeated_keys() {
        let profile = JobSizeProfile::from_sorted(vec![(100, 25.0), (100, 25.0), (200, 50.0)]);
        assert_eq!(profile.points(), &[(100, 50.0), (200, 100.0)]);
        assert_eq!(profile.total(), 100.0);
    }

    #[test]
    fn test_job_size_profile_is_non_decreasing() {
        let profile =
            JobSizeProfile::from_sorted((0..50u64).map(|k| (k * 3, (k % 7) as f64 * 0.5)));
        let values: Vec<f64> = profile.points().iter().map(|(_, v)| *v).collect();
        assert!(is_non_decreasing(&values));
    }

    #[test]
    fn test_empty_profiles() {
        assert!(JobSizeProfile::from_sorted(Vec::new()).is_empty());
        assert_eq!(JobSizeProfile::default().total(), 0.0);
        assert!(RatioProfile::from_sorted(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_ratio_slots() {
        assert_eq!(ratio_slot(0.0), 0);
        assert_eq!(ratio_slot(1.0), 4096);
        assert_eq!(ratio_slot(0.5 / 4096.0), 1);
        assert_eq!(slot_ratio(2048), 0.5);
    }

    #[test]
    fn test_ratio_profile_carries_values_forward() {
        let profile =
            RatioProfile::from_sorted(vec![(1.0 / 4096.0, 1.0), (4.0 / 4096.0, 2.0)]).unwrap();
        assert_eq!(profile.slots(), &[0.0, 1.0, 1.0, 1.0, 3.0]);
        assert_eq!(profile.max_ratio(), 4.0 / 4096.0);
    }

    #[test]
    fn test_ratio_profile_same_slot() {
        let profile =
            RatioProfile::from_sorted(vec![(0.25, 1.0), (0.25, 1.0), (0.5, 1.0)]).unwrap();
        assert_eq!(profile.len(), 2049);
        assert_eq!(profile.slots()[1024], 2.0);
        assert_eq!(profile.slots()[1500], 2.0);
        assert_eq!(profile.slots()[2048], 3.0);
        assert!(is_non_decreasing(profile.slots()));
    }

    #[test]
    fn test_ratio_profile_too_large() {
        let result = RatioProfile::from_sorted(vec![(1.0e9, 1.0)]);
        assert!(matches!(result, Err(AnalyzerError::ProfileTooLarge { .. })));
    }

    #[test]
    fn test_ratio_profile_limit_boundary() {
        let max_ratio = MAX_RATIO_SLOTS as f64 / RATIO_SCALE;
        match RatioProfile::from_sorted(vec![(max_ratio, 1.0)]) {
            Err(AnalyzerError::ProfileTooLarge { slots, limit }) => {
                assert_eq!(slots, MAX_RATIO_SLOTS + 1);
                assert_eq!(limit, MAX_RATIO_SLOTS);
            }
            other => panic!("expected profile too large, got {other:?}"),
        }

        let profile = RatioProfile::from_sorted(vec![(8.0, 1.0)]).unwrap();
        assert_eq!(profile.len(), 8 * 4096 + 1);
    }
}
