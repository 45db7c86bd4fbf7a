//! Expected goodput and displacement factor

use crate::models::Rates;
use crate::trace::TraceStatistics;
use serde::Serialize;

/// Goodput delivered to innocent traffic and the damage per unit of attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoodputEstimate {
    pub expected_goodput: f64,
    pub displacement: f64,
}

impl GoodputEstimate {
    /// Derive the displacement factor for a raw goodput figure.
    ///
    /// Goodput is capped at the ideal `min(r_I, r_max)`, so the displacement
    /// factor is never negative.
    pub fn evaluate(rates: &Rates, stats: &TraceStatistics, goodput: f64) -> Self {
        let ideal = stats.ideal_goodput(rates.innocent_gbps);
        let expected_goodput = goodput.min(ideal);

        let displacement = if rates.attack_gbps == 0.0 {
            0.0
        } else {
            (ideal - expected_goodput).max(0.0) / rates.attack_gbps
        };

        Self {
            expected_goodput,
            displacement,
        }
    }

    /// Goodput from the packet volume that survives scheduling
    pub fn from_scheduled_size(rates: &Rates, stats: &TraceStatistics, scheduled_size: u64) -> Self {
        let offered = stats.total_packets() as f64 * stats.average_packet_size() as f64;
        let goodput = rates.innocent_gbps * scheduled_size as f64 / offered;
        Self::evaluate(rates, stats, goodput)
    }
}

/// Sum the packet sizes of admitted items.
///
/// `items` must be sorted ascending by the admission value; the scan stops at
/// the first rejected item.
pub fn scheduled_size<I, F>(items: I, mut admits: F) -> u64
where
    I: IntoIterator<Item = (f64, u64)>,
    F: FnMut(f64) -> bool,
{
    let mut total = 0;
    for (value, packet_size) in items {
        if !admits(value) {
            break;
        }
        total += packet_size;
    }
    total
}
