//! Trace-wide baseline statistics
//!
//! Statistics are accumulated while the trace streams in and normalized
//! exactly once, after the last record. `TraceStatistics` can only be
//! obtained from `TraceStatsBuilder::finish`, so unnormalized sums never
//! leak to the analyzers.

use crate::error::{AnalyzerError, Result};
use crate::models::PacketRecord;
use serde::Serialize;

/// Running sums and maxima over the trace
#[derive(Debug, Clone, Default)]
pub struct TraceStatsBuilder {
    count: u64,
    packet_size_sum: u64,
    packet_size_max: u64,
    job_size_sum: f64,
    job_size_max: f64,
}

impl TraceStatsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &PacketRecord) {
        self.count += 1;
        self.packet_size_sum += record.packet_size;
        self.packet_size_max = self.packet_size_max.max(record.packet_size);
        self.job_size_sum += record.job_size;
        self.job_size_max = self.job_size_max.max(record.job_size);
    }

    /// Number of records observed so far
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Normalize the sums. Fails on an empty trace.
    pub fn finish(self) -> Result<TraceStatistics> {
        if self.count == 0 {
            return Err(AnalyzerError::EmptyTrace);
        }

        let count = self.count as f64;
        let average_packet_size = self.packet_size_sum as f64 / count;
        let average_job_size = self.job_size_sum / count;

        Ok(TraceStatistics {
            total_packets: self.count,
            // Packet sizes are discrete; r_max uses the exact mean
            average_packet_size: average_packet_size as u64,
            maximum_packet_size: self.packet_size_max,
            average_job_size,
            maximum_job_size: self.job_size_max,
            r_max: average_packet_size / average_job_size,
        })
    }
}

/// Normalized statistics of the innocent traffic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStatistics {
    total_packets: u64,
    average_packet_size: u64,
    maximum_packet_size: u64,
    average_job_size: f64,
    maximum_job_size: f64,
    r_max: f64,
}

impl TraceStatistics {
    pub fn total_packets(&self) -> u64 {
        self.total_packets
    }

    /// Average packet size in bits, truncated to an integer
    pub fn average_packet_size(&self) -> u64 {
        self.average_packet_size
    }

    pub fn maximum_packet_size(&self) -> u64 {
        self.maximum_packet_size
    }

    pub fn average_job_size(&self) -> f64 {
        self.average_job_size
    }

    pub fn maximum_job_size(&self) -> f64 {
        self.maximum_job_size
    }

    /// Highest rate the innocent traffic alone can sustain (Gbps)
    pub fn r_max(&self) -> f64 {
        self.r_max
    }

    /// Ideal goodput for an offered innocent rate
    pub fn ideal_goodput(&self, innocent_gbps: f64) -> f64 {
        innocent_gbps.min(self.r_max)
    }
}
