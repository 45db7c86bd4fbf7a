//! Structured logging for analysis runs
//!
//! Events carry an `event` field and a stable set of keys so JSON log output
//! can be filtered per policy or per trace.

use crate::models::{AttackStrategy, Rates};
use crate::policy::Policy;
use crate::trace::IngestSummary;
use tracing::{info, warn};

/// Structured logger for analysis events
///
/// Every event is tagged with the trace it belongs to.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    trace: String,
}

impl AnalysisLogger {
    pub fn new(trace: impl Into<String>) -> Self {
        Self {
            trace: trace.into(),
        }
    }

    /// Log a completed ingestion pass
    pub fn log_trace_ingested(&self, summary: &IngestSummary) {
        let stats = &summary.statistics;
        info!(
            event = "trace_ingested",
            trace = %self.trace,
            sha256 = %summary.sha256,
            total_packets = stats.total_packets(),
            average_packet_size = stats.average_packet_size(),
            average_job_size = stats.average_job_size(),
            maximum_job_size = stats.maximum_job_size(),
            r_max = stats.r_max(),
            "Trace ingested"
        );
    }

    /// Log that a policy analyzer is ready for queries
    pub fn log_analyzer_ready(&self, policy: Policy) {
        info!(
            event = "analyzer_ready",
            trace = %self.trace,
            policy = %policy,
            "Policy analyzer built"
        );
    }

    /// Log a computed strategy
    ///
    /// A strategy that leaves innocent goodput untouched under a non-zero
    /// attack is logged at warn level.
    pub fn log_strategy(&self, policy: Policy, rates: &Rates, strategy: &AttackStrategy) {
        if rates.attack_gbps > 0.0 && strategy.expected_displacement == 0.0 {
            warn!(
                event = "strategy_computed",
                trace = %self.trace,
                policy = %policy,
                innocent_gbps = rates.innocent_gbps,
                attack_gbps = rates.attack_gbps,
                job_size_ns = strategy.actual_job_size_ns,
                packet_size_bits = strategy.packet_size_bits,
                "Attack has no effect on innocent goodput"
            );
        } else {
            info!(
                event = "strategy_computed",
                trace = %self.trace,
                policy = %policy,
                innocent_gbps = rates.innocent_gbps,
                attack_gbps = rates.attack_gbps,
                job_size_ns = strategy.actual_job_size_ns,
                packet_size_bits = strategy.packet_size_bits,
                expected_goodput_gbps = strategy.expected_goodput_gbps,
                expected_displacement = strategy.expected_displacement,
                "Computed optimal attack strategy"
            );
        }
    }

    /// Log an output artifact written to disk
    pub fn log_artifact(&self, kind: &str, path: &std::path::Path) {
        info!(
            event = "artifact_written",
            trace = %self.trace,
            kind = %kind,
            path = %path.display(),
            "Wrote output file"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_logger_creation() {
        let logger = AnalysisLogger::new("trace.csv");
        assert_eq!(logger.trace, "trace.csv");
    }

    #[test]
    fn test_log_strategy_without_subscriber() {
        let logger = AnalysisLogger::new("trace.csv");
        let strategy = AttackStrategy {
            estimated_job_size_ns: 99.0,
            actual_job_size_ns: 99.0,
            packet_size_bits: 512,
            expected_goodput_gbps: 0.0,
            expected_displacement: 0.0,
        };
        logger.log_strategy(Policy::Sjf, &Rates::new(1.0, 2.0), &strategy);
        logger.log_strategy(Policy::Sjf, &Rates::new(1.0, 0.0), &strategy);
    }
}
