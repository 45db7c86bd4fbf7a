//! Stand-alone strategy analysis

use adversary_lib::{analyze_trace, AnalysisLogger, AnalyzerConfig};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tabled::Tabled;

use super::{compute_report, Selection};
use crate::output::{
    format_displacement, format_goodput, print_header, print_statistics, print_table,
    print_warning, OutputFormat,
};

/// Row for the strategy table
#[derive(Tabled)]
struct StrategyRow {
    #[tabled(rename = "Policy")]
    policy: String,
    #[tabled(rename = "r_I")]
    innocent_rate: String,
    #[tabled(rename = "r_A")]
    attack_rate: String,
    #[tabled(rename = "Job size (ns)")]
    job_size: String,
    #[tabled(rename = "Packet size (bits)")]
    packet_size: u64,
    #[tabled(rename = "Goodput")]
    goodput: String,
    #[tabled(rename = "DF")]
    displacement: String,
}

pub fn run(config: &Path, trace: &Path, selection: &Selection, format: OutputFormat) -> Result<()> {
    if selection.is_empty() {
        print_warning("Either no policies or rates were specified, nothing to analyze");
        return Ok(());
    }

    let config = AnalyzerConfig::load(config)
        .with_context(|| format!("Failed to load configuration {}", config.display()))?;
    let logger = AnalysisLogger::new(trace.display().to_string());

    let analysis = analyze_trace(trace, &selection.policies, config.bounds())
        .with_context(|| format!("Failed to analyze trace {}", trace.display()))?;
    logger.log_trace_ingested(&analysis.summary);
    for analyzer in &analysis.analyzers {
        logger.log_analyzer_ready(analyzer.policy());
    }

    let report = compute_report(trace, &analysis, selection, &logger);

    match format {
        OutputFormat::Json => {
            let json = report
                .to_json_pretty()
                .context("Failed to serialize report")?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            print_header("Trace Statistics");
            println!("Trace:                  {}", trace.display().to_string().cyan());
            println!("SHA-256:                {}", report.trace.sha256);
            print_statistics(&analysis.summary.statistics);

            let rows: Vec<StrategyRow> = report
                .runs
                .iter()
                .map(|run| StrategyRow {
                    policy: run.policy.to_string(),
                    innocent_rate: format!("{}bps", run.innocent_rate.pretty()),
                    attack_rate: format!("{}bps", run.attack_rate.pretty()),
                    job_size: format!("{:.2}", run.strategy.estimated_job_size_ns),
                    packet_size: run.strategy.packet_size_bits,
                    goodput: format_goodput(run.policy, run.strategy.expected_goodput_gbps),
                    displacement: format_displacement(run.policy, run.strategy.expected_displacement),
                })
                .collect();

            print_header("Optimal Attack Strategies");
            print_table(&rows);
        }
    }

    Ok(())
}
