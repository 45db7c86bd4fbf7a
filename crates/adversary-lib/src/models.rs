//! Core data models for adversarial strategy analysis

use serde::{Deserialize, Serialize};

/// Smallest packet the simulator emits, in bits (64B)
pub const MIN_PACKET_SIZE: u64 = 512;

/// Largest packet the simulator emits, in bits (1518B)
pub const MAX_PACKET_SIZE: u64 = 12144;

/// A single innocent packet observed under a scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    pub arrival_time: f64,
    pub departure_time: f64,
    pub flow_id: String,
    pub class_tag: String,
    /// Wire size in bits
    pub packet_size: u64,
    /// Estimated service time in ns
    pub job_size: f64,
}

impl PacketRecord {
    /// Job size per bit of packet
    pub fn cost_ratio(&self) -> f64 {
        self.job_size / self.packet_size as f64
    }

    pub fn cost_sample(&self) -> CostSample {
        CostSample {
            packet_size: self.packet_size,
            job_size: self.job_size,
        }
    }
}

/// The scheduling-relevant part of a packet record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostSample {
    pub packet_size: u64,
    pub job_size: f64,
}

impl CostSample {
    pub fn cost_ratio(&self) -> f64 {
        self.job_size / self.packet_size as f64
    }
}

/// An adversary's optimal strategy for one (policy, r_I, r_A) triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackStrategy {
    /// Job size the adversary announces (ns)
    pub estimated_job_size_ns: f64,
    /// Job size the adversary actually costs (ns)
    pub actual_job_size_ns: f64,
    /// Packet size the adversary emits (bits)
    pub packet_size_bits: u64,
    /// Theoretical innocent goodput (Gbps)
    pub expected_goodput_gbps: f64,
    /// Theoretical displacement factor
    pub expected_displacement: f64,
}

/// Offered load for one analysis point, in Gbps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub innocent_gbps: f64,
    pub attack_gbps: f64,
}

impl Rates {
    pub fn new(innocent_gbps: f64, attack_gbps: f64) -> Self {
        Self {
            innocent_gbps,
            attack_gbps,
        }
    }
}

/// External limits on what the adversary may emit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackBounds {
    /// Largest job size the adversary may request (ns)
    pub max_attack_job_size_ns: f64,
    /// Packet size the ratio encoder rescales up to (bits)
    pub min_attack_packet_size_bits: u64,
}
