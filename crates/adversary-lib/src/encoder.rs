//! Strategy encoding
//!
//! Turns a continuous optimum into a concrete (job size, packet size) pair.
//! Job-size policies use the threshold directly with minimum-size packets.
//! Ratio policies approximate the optimal ratio by a fraction whose
//! denominator is a realizable packet size.

use crate::goodput::GoodputEstimate;
use crate::models::{AttackStrategy, MAX_PACKET_SIZE, MIN_PACKET_SIZE};

/// Fixed-point scale used to turn an f64 into an exact fraction
const FIXED_POINT_BITS: u32 = 64;

/// Ratios at or above this are approximated by their nearest integer
const MAX_EXACT_VALUE: f64 = (1u64 << 40) as f64;

/// A non-negative fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: u64,
    pub denominator: u64,
}

/// A concrete adversarial packet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedAttack {
    pub job_size: f64,
    pub packet_size: u64,
}

impl EncodedAttack {
    /// Attach the goodput estimate this attack achieves
    pub fn into_strategy(self, estimate: GoodputEstimate) -> AttackStrategy {
        AttackStrategy {
            estimated_job_size_ns: self.job_size,
            actual_job_size_ns: self.job_size,
            packet_size_bits: self.packet_size,
            expected_goodput_gbps: estimate.expected_goodput,
            expected_displacement: estimate.displacement,
        }
    }
}

/// Job-size policies: the threshold is the job size, packets are minimum-sized
pub fn encode_job_size(threshold: f64) -> EncodedAttack {
    EncodedAttack {
        job_size: threshold,
        packet_size: MIN_PACKET_SIZE,
    }
}

/// Ratio policies: approximate `ratio` as job/packet with packet <=
/// `MAX_PACKET_SIZE`, then scale a too-small packet up to `min_packet_size`.
pub fn encode_cost_ratio(ratio: f64, min_packet_size: u64) -> EncodedAttack {
    let fraction = best_rational(ratio, MAX_PACKET_SIZE);
    let (numerator, denominator) = if fraction.denominator < min_packet_size {
        let scale = min_packet_size as f64 / fraction.denominator as f64;
        ((fraction.numerator as f64 * scale) as u64, min_packet_size)
    } else {
        (fraction.numerator, fraction.denominator)
    };

    EncodedAttack {
        job_size: numerator as f64,
        packet_size: denominator,
    }
}

/// Closest fraction to `value` with denominator at most `max_denominator`.
///
/// Walks the continued-fraction expansion of `value` (taken exactly at
/// 64-bit fixed point) and compares the last admissible convergent with the
/// best semiconvergent. Negative and NaN inputs map to zero.
pub fn best_rational(value: f64, max_denominator: u64) -> Fraction {
    let max_denominator = max_denominator.max(1) as u128;
    if value.is_nan() || value <= 0.0 {
        return Fraction {
            numerator: 0,
            denominator: 1,
        };
    }
    if value >= MAX_EXACT_VALUE {
        return Fraction {
            numerator: value.round() as u64,
            denominator: 1,
        };
    }

    let scale = 1u128 << FIXED_POINT_BITS;
    let (target_n, target_d) = reduce((value * scale as f64).round() as u128, scale);
    if target_d <= max_denominator {
        return to_fraction(target_n, target_d);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (0u128, 1u128, 1u128, 0u128);
    let (mut n, mut d) = (target_n, target_d);
    loop {
        let a = n / d;
        let q2 = q0 + a * q1;
        if q2 > max_denominator {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
        (n, d) = (d, n - a * d);
    }

    let k = (max_denominator - q0) / q1;
    let semiconvergent = (p0 + k * p1, q0 + k * q1);
    let convergent = (p1, q1);

    if distance(convergent, (target_n, target_d)) <= distance(semiconvergent, (target_n, target_d))
    {
        to_fraction(convergent.0, convergent.1)
    } else {
        to_fraction(semiconvergent.0, semiconvergent.1)
    }
}

/// |p/q - n/d| scaled by q * d, compared across candidates via cross-multiplication
fn distance(candidate: (u128, u128), target: (u128, u128)) -> Distance {
    let (p, q) = candidate;
    let (n, d) = target;
    Distance {
        numerator: (p * d).abs_diff(n * q),
        denominator: q,
    }
}

#[derive(Debug, Clone, Copy)]
struct Distance {
    numerator: u128,
    denominator: u128,
}

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.numerator * other.denominator == other.numerator * self.denominator
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        (self.numerator * other.denominator).partial_cmp(&(other.numerator * self.denominator))
    }
}

fn reduce(n: u128, d: u128) -> (u128, u128) {
    let g = gcd(n, d);
    if g == 0 {
        (0, 1)
    } else {
        (n / g, d / g)
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn to_fraction(n: u128, d: u128) -> Fraction {
    let (n, d) = reduce(n, d);
    Fraction {
        numerator: n as u64,
        denominator: d as u64,
    }
}
