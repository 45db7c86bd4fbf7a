//! Output formatting utilities

use adversary_lib::{Policy, TraceStatistics};
use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of rows
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No strategies computed".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a section header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print the trace-wide statistics block
pub fn print_statistics(stats: &TraceStatistics) {
    println!("Packets:                {}", stats.total_packets());
    println!(
        "Average packet size:    {} bits (max {})",
        stats.average_packet_size(),
        stats.maximum_packet_size()
    );
    println!(
        "Average job size:       {:.2} ns (max {:.2})",
        stats.average_job_size(),
        stats.maximum_job_size()
    );
    println!("Max innocent rate:      {}", format_gbps(stats.r_max()).cyan());
    println!();
}

/// Format a rate in Gbps
pub fn format_gbps(gbps: f64) -> String {
    format!("{:.4} Gbps", gbps)
}

/// Goodput column; FQ estimates are not reported
pub fn format_goodput(policy: Policy, gbps: f64) -> String {
    if policy.has_validated_goodput() {
        format_gbps(gbps)
    } else {
        "n/a".dimmed().to_string()
    }
}

/// Displacement column, colored by severity
pub fn format_displacement(policy: Policy, displacement: f64) -> String {
    if !policy.has_validated_goodput() {
        return "n/a".dimmed().to_string();
    }
    let formatted = format!("{:.4}", displacement);
    if displacement >= 1.0 {
        formatted.red().to_string()
    } else if displacement > 0.0 {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}
