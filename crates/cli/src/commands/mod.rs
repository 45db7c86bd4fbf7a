//! CLI command implementations

pub mod analyze;
pub mod generate;

use adversary_lib::rate::parse_list;
use adversary_lib::{AnalysisLogger, AnalysisReport, Policy, Rate, Rates, TraceAnalysis};
use anyhow::{Context, Result};
use std::path::Path;

/// Policies and rate grid requested on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub policies: Vec<Policy>,
    pub innocent_rates: Vec<Rate>,
    pub attack_rates: Vec<Rate>,
}

impl Selection {
    pub fn parse(policies: &str, innocent_rates: &str, attack_rates: &str) -> Result<Self> {
        Ok(Self {
            policies: parse_list(policies).context("Invalid --policies")?,
            innocent_rates: parse_list(innocent_rates).context("Invalid --innocent-rates")?,
            attack_rates: parse_list(attack_rates).context("Invalid --attack-rates")?,
        })
    }

    /// True when any of the three lists is empty, i.e. there is nothing to run
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty() || self.innocent_rates.is_empty() || self.attack_rates.is_empty()
    }
}

/// Compute every (policy, r_I, r_A) strategy in selection order
pub fn compute_report(
    trace: &Path,
    analysis: &TraceAnalysis,
    selection: &Selection,
    logger: &AnalysisLogger,
) -> AnalysisReport {
    let mut report = AnalysisReport::new(trace, analysis);

    for analyzer in &analysis.analyzers {
        for &innocent in &selection.innocent_rates {
            for &attack in &selection.attack_rates {
                let rates = Rates::new(innocent.as_gbps(), attack.as_gbps());
                let strategy = analyzer.compute_optimal_strategy(&rates);
                logger.log_strategy(analyzer.policy(), &rates, &strategy);
                report.push(analyzer.policy(), innocent, attack, strategy);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_parse_dedups_and_canonicalizes() {
        let selection = Selection::parse("sjf, fcfs,,sjf", "1G,1000000000", "0,500M").unwrap();
        assert_eq!(selection.policies, vec![Policy::Sjf, Policy::Fcfs]);
        assert_eq!(selection.innocent_rates, vec![Rate::from_bps(1_000_000_000)]);
        assert_eq!(
            selection.attack_rates,
            vec![Rate::from_bps(0), Rate::from_bps(500_000_000)]
        );
        assert!(!selection.is_empty());
    }

    #[test]
    fn test_selection_empty_lists() {
        let selection = Selection::parse("fcfs", "", "1G").unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_rejects_unknown_policy() {
        assert!(Selection::parse("fcfs,lifo", "1G", "1G").is_err());
    }
}
