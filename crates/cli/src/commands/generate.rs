//! Simulation job generation
//!
//! Lays out an output directory with one libconfig configuration per
//! (policy, r_I, r_A) triple, a `jobs.sh` script that runs them all, and a
//! `strategies.json` report of the strategies behind each configuration.

use adversary_lib::libconfig;
use adversary_lib::{analyze_trace, AnalysisLogger, AnalyzerConfig, Policy, Rate};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use super::{compute_report, Selection};
use crate::output::{print_header, print_info, print_success, print_warning, format_gbps};
use crate::template::{JobParameters, SimulationTemplate};

const SUBDIRECTORIES: [&str; 3] = ["configs", "packets", "outputs"];

/// Where the simulator lives and where its jobs go
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub simulator: PathBuf,
    pub template: PathBuf,
    pub output_dir: PathBuf,
    pub keep_packets: bool,
    /// Existing trace; a dry-run produces one when absent
    pub trace: Option<PathBuf>,
}

impl JobSpec {
    fn config_path(&self, policy: Policy, name: &str) -> PathBuf {
        self.output_dir
            .join("configs")
            .join(policy.name())
            .join(format!("{name}.{}", libconfig::EXTENSION))
    }

    fn packets_path(&self, policy: Policy, name: &str) -> PathBuf {
        self.output_dir
            .join("packets")
            .join(policy.name())
            .join(format!("{name}.packets"))
    }

    fn summary_path(&self, policy: Policy, name: &str) -> PathBuf {
        self.output_dir
            .join("outputs")
            .join(policy.name())
            .join(format!("{name}.out"))
    }

    /// One line of `jobs.sh`
    fn job_line(&self, policy: Policy, name: &str) -> String {
        let mut line = format!(
            "{} --config={} ",
            self.simulator.display(),
            self.config_path(policy, name).display()
        );
        if self.keep_packets {
            let _ = write!(line, "--packets={} ", self.packets_path(policy, name).display());
        }
        let _ = write!(line, "| tee {}", self.summary_path(policy, name).display());
        line
    }
}

/// File stem shared by a job's config, packet log and output
fn job_name(innocent: Rate, attack: Rate) -> String {
    format!("I{innocent}_A{attack}")
}

pub fn run(job: &JobSpec, selection: &Selection) -> Result<()> {
    if selection.is_empty() {
        print_info("Either no policies or rates were specified, returning early");
        return Ok(());
    }

    let template = SimulationTemplate::load(&job.template)?;
    let config = AnalyzerConfig::load(&job.template)
        .with_context(|| format!("Failed to load configuration {}", job.template.display()))?;

    let warnings = prepare_output_dir(job)?;
    let trace = obtain_trace(job)?;

    for subdir in SUBDIRECTORIES {
        for policy in &selection.policies {
            let path = job.output_dir.join(subdir).join(policy.name());
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
        }
    }

    print_header("Job Generation");
    for warning in &warnings {
        print_warning(warning);
    }
    println!("Computing optimal adversarial strategies");

    let logger = AnalysisLogger::new(trace.display().to_string());
    let analysis = analyze_trace(&trace, &selection.policies, config.bounds())
        .with_context(|| format!("Failed to analyze trace {}", trace.display()))?;
    logger.log_trace_ingested(&analysis.summary);

    let report = compute_report(&trace, &analysis, selection, &logger);
    let average_packet_size_bits = analysis.summary.statistics.average_packet_size();

    let mut jobs = String::new();
    let mut current: Option<(Policy, Rate)> = None;
    for run in &report.runs {
        if current.map(|(p, _)| p) != Some(run.policy) {
            println!();
            println!("Policy: {}", run.policy.name().bold());
        }
        if current != Some((run.policy, run.innocent_rate)) {
            println!("\tFor r_I = {}bps", run.innocent_rate.pretty());
        }
        current = Some((run.policy, run.innocent_rate));
        println!("\t\t{}", summary_line(run.policy, run.attack_rate, &run.strategy));

        let name = job_name(run.innocent_rate, run.attack_rate);
        let config_path = job.config_path(run.policy, &name);
        template.write(
            &JobParameters {
                policy: run.policy,
                innocent_rate: run.innocent_rate,
                average_packet_size_bits,
                attack_rate: run.attack_rate,
                strategy: &run.strategy,
            },
            &config_path,
        )?;
        debug!(path = %config_path.display(), "Wrote job configuration");

        jobs.push_str(&job.job_line(run.policy, &name));
        jobs.push('\n');
    }
    println!();

    let jobs_path = job.output_dir.join("jobs.sh");
    fs::write(&jobs_path, jobs)
        .with_context(|| format!("Failed to write {}", jobs_path.display()))?;
    make_executable(&jobs_path)?;
    logger.log_artifact("jobs", &jobs_path);

    let report_path = job.output_dir.join("strategies.json");
    let json = report
        .to_json_pretty()
        .context("Failed to serialize report")?;
    fs::write(&report_path, json)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    logger.log_artifact("report", &report_path);

    print_success(&format!("Generated jobs: {}", jobs_path.display()));
    Ok(())
}

fn summary_line(policy: Policy, attack: Rate, strategy: &adversary_lib::AttackStrategy) -> String {
    let mut line = format!(
        "For r_A = {}bps: J_A = {:.2}, P_A = {}",
        attack.pretty(),
        strategy.estimated_job_size_ns,
        strategy.packet_size_bits
    );
    if policy.has_validated_goodput() {
        let _ = write!(
            line,
            ", Expected Goodput = {} (Expected DF = {:.4})",
            format_gbps(strategy.expected_goodput_gbps),
            strategy.expected_displacement
        );
    }
    line
}

/// Recreate the output directory and copy the template into it.
/// Returns warnings to show once the header is printed.
fn prepare_output_dir(job: &JobSpec) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    let out = &job.output_dir;

    if out.is_file() {
        warn!(path = %out.display(), "Output path is a file, removing it");
        fs::remove_file(out).with_context(|| format!("Failed to remove {}", out.display()))?;
        warnings.push("Output path exists, contents will be truncated".to_string());
    } else if out.is_dir() {
        warn!(path = %out.display(), "Output directory exists, removing it");
        fs::remove_dir_all(out).with_context(|| format!("Failed to remove {}", out.display()))?;
        warnings.push("Output path exists, contents will be truncated".to_string());
    } else if out.exists() {
        bail!("{} is not a file or directory", out.display());
    }

    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let extension = job
        .template
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(libconfig::EXTENSION);
    let copy = out.join(format!("template.{extension}"));
    fs::copy(&job.template, &copy)
        .with_context(|| format!("Failed to copy template to {}", copy.display()))?;

    Ok(warnings)
}

/// Use the supplied trace, or dry-run the simulator to produce one
fn obtain_trace(job: &JobSpec) -> Result<PathBuf> {
    if let Some(trace) = &job.trace {
        return Ok(trace.clone());
    }

    let trace = job.output_dir.join("log.packets");
    debug!(simulator = %job.simulator.display(), "Running simulator dry-run");
    let status = Command::new(&job.simulator)
        .arg(format!("--config={}", job.template.display()))
        .arg(format!("--packets={}", trace.display()))
        .arg("--dry")
        .status()
        .with_context(|| format!("Failed to launch simulator {}", job.simulator.display()))?;

    if !status.success() {
        warn!(%status, "Simulator dry-run exited unsuccessfully");
    }
    if !trace.is_file() {
        bail!("Simulation dry-run failed: no trace at {}", trace.display());
    }
    Ok(trace)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("Failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(keep_packets: bool) -> JobSpec {
        JobSpec {
            simulator: PathBuf::from("/opt/sim"),
            template: PathBuf::from("/tmp/template.cfg"),
            output_dir: PathBuf::from("/tmp/out"),
            keep_packets,
            trace: None,
        }
    }

    #[test]
    fn test_job_name_uses_canonical_rates() {
        let name = job_name(Rate::from_bps(1_000_000_000), Rate::from_bps(500_000_000));
        assert_eq!(name, "I1G_A500M");
    }

    #[test]
    fn test_job_line_without_packets() {
        let line = spec(false).job_line(Policy::Sjf, "I1G_A1G");
        assert_eq!(
            line,
            "/opt/sim --config=/tmp/out/configs/sjf/I1G_A1G.cfg | tee /tmp/out/outputs/sjf/I1G_A1G.out"
        );
    }

    #[test]
    fn test_job_line_with_packets() {
        let line = spec(true).job_line(Policy::Wsjf, "I1G_A1G");
        assert!(line.contains("--packets=/tmp/out/packets/wsjf/I1G_A1G.packets | tee"));
    }

    #[test]
    fn test_fq_summary_omits_goodput() {
        let strategy = adversary_lib::AttackStrategy {
            estimated_job_size_ns: 1000.0,
            actual_job_size_ns: 1000.0,
            packet_size_bits: 512,
            expected_goodput_gbps: 0.5,
            expected_displacement: 0.5,
        };
        let fq = summary_line(Policy::Fq, Rate::from_bps(1_000_000), &strategy);
        assert_eq!(fq, "For r_A = 1 Mbps: J_A = 1000.00, P_A = 512");

        let sjf = summary_line(Policy::Sjf, Rate::from_bps(1_000_000), &strategy);
        assert!(sjf.contains("Expected Goodput = 0.5000 Gbps (Expected DF = 0.5000)"));
    }
}
