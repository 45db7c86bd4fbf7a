//! Adversarial scheduler analysis CLI
//!
//! Computes optimal attack strategies from a simulator packet trace and
//! generates simulation jobs that exercise them.

mod commands;
mod output;
mod template;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use commands::{analyze, generate};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ALL_POLICIES: &str = "fcfs,fq,sjf,sjf_inorder,wsjf,wsjf_inorder";

/// Adversarial scheduler analysis CLI
#[derive(Parser)]
#[command(name = "advgen")]
#[command(author, version, about = "Adversarial strategy analysis for packet schedulers", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose (debug) logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute optimal attack strategies for a trace
    Analyze {
        /// Simulator configuration holding the attack bounds
        #[arg(long, short)]
        config: PathBuf,

        /// Innocent packet trace
        #[arg(long, short)]
        trace: PathBuf,

        /// Comma-separated list of policies
        #[arg(long, default_value = ALL_POLICIES)]
        policies: String,

        /// Comma-separated innocent rates (e.g., '1G,10G')
        #[arg(long)]
        innocent_rates: String,

        /// Comma-separated attack rates (same format as --innocent-rates)
        #[arg(long)]
        attack_rates: String,
    },

    /// Generate simulation jobs running each optimal attack
    Generate {
        /// Path to the simulator binary
        simulator: PathBuf,

        /// Configuration file used as a template for every job
        template: PathBuf,

        /// Target output directory (existing contents are removed)
        output_dir: PathBuf,

        /// Comma-separated list of policies to simulate (e.g., 'fcfs,wsjf')
        #[arg(long, default_value = "")]
        policies: String,

        /// Comma-separated innocent rates (e.g., '1000,1M')
        #[arg(long, default_value = "")]
        innocent_rates: String,

        /// Comma-separated attack rates (same format as --innocent-rates)
        #[arg(long, default_value = "")]
        attack_rates: String,

        /// Save packet logs for each simulation run
        #[arg(long)]
        keep_packets: bool,

        /// Use an existing trace instead of a simulator dry-run
        #[arg(long)]
        trace: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json = matches!(format, LogFormat::Json);
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Analyze {
            config,
            trace,
            policies,
            innocent_rates,
            attack_rates,
        } => {
            let selection =
                commands::Selection::parse(&policies, &innocent_rates, &attack_rates)?;
            analyze::run(&config, &trace, &selection, cli.format)?;
        }
        Commands::Generate {
            simulator,
            template,
            output_dir,
            policies,
            innocent_rates,
            attack_rates,
            keep_packets,
            trace,
        } => {
            let selection =
                commands::Selection::parse(&policies, &innocent_rates, &attack_rates)?;
            let job = generate::JobSpec {
                simulator,
                template,
                output_dir,
                keep_packets,
                trace,
            };
            generate::run(&job, &selection)?;
        }
    }

    Ok(())
}
