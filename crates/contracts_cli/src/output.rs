use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use contracts_validator::{BatchReport, QualityResult, ValidationError, ValidationReport};
use contracts_versioning::{Change, ChangeReport, RiskLevel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_banner(title: &str) {
    println!("\n{}", "═".repeat(60));
    println!("  {}", title.bold());
    println!("{}", "═".repeat(60));
}

fn print_status(passed: bool) {
    if passed {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }
}

fn print_errors(errors: &[ValidationError]) {
    if errors.is_empty() {
        return;
    }
    println!("\n{}", "Errors:".red().bold());
    for (i, error) in errors.iter().enumerate() {
        println!(
            "  {}. [{}] {}",
            i + 1,
            error.error_type,
            error.to_string().red()
        );
        if let Some(value) = &error.value {
            println!("     value:    {}", value);
        }
        if let Some(expected) = &error.expected {
            println!("     expected: {}", expected);
        }
    }
}

fn print_quality(quality: &QualityResult) {
    println!("\n{} {}", "Quality score:".bold(), quality.quality_score);
    for issue in &quality.issues {
        let line = format!("[{}] {}", issue.rule, issue.message);
        println!("  {} {}", issue.severity, line.yellow());
    }
}

pub fn print_record_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Text => {
            print_banner("RECORD VALIDATION REPORT");
            print_status(report.passed());
            print_errors(&report.errors);

            println!("\n{}", "Summary:".bold());
            println!("  Status:         {}", report.status);
            println!("  Total errors:   {}", report.errors.len());
            println!("  Execution time: {:.2} ms", report.execution_time_ms);
            println!("{}", "═".repeat(60));
            Ok(())
        }
    }
}

pub fn print_batch_report(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Text => {
            print_banner("BATCH VALIDATION REPORT");
            print_status(report.status.is_pass());

            println!("\n{}", "Summary:".bold());
            println!("  Status:         {}", report.status);
            println!("  Total records:  {}", report.total_records);
            println!("  Passed:         {}", report.passed);
            println!("  Failed:         {}", report.failed);
            println!("  Pass rate:      {:.2}%", report.pass_rate);
            println!("  Execution time: {:.2} ms", report.execution_time_ms);

            if !report.errors_summary.is_empty() {
                println!("\n{}", "Errors by type:".bold());
                for (error_type, count) in &report.errors_summary {
                    println!("  {:<24} {}", error_type.to_string(), count);
                }
            }

            print_errors(&report.sample_errors);

            if let Some(quality) = &report.quality {
                print_quality(quality);
            }
            println!("{}", "═".repeat(60));
            Ok(())
        }
    }
}

fn risk_color(level: RiskLevel) -> ColoredString {
    match level {
        RiskLevel::Low => level.as_str().green(),
        RiskLevel::Medium => level.as_str().yellow(),
        RiskLevel::High | RiskLevel::Critical => level.as_str().red(),
    }
}

fn print_change(change: &Change) {
    println!("  - [{}] {}: {}", change.kind, change.field, change.description);
    if change.old_value.is_some() || change.new_value.is_some() {
        println!(
            "      {} -> {}",
            change.old_value.as_deref().unwrap_or("none"),
            change.new_value.as_deref().unwrap_or("none")
        );
    }
    println!("      impact: {}", change.impact.dimmed());
}

pub fn print_change_report(report: &ChangeReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Text => {
            print_banner("CHANGE REPORT");

            if !report.breaking_changes.is_empty() {
                println!("\n{}", "Breaking changes:".red().bold());
                report.breaking_changes.iter().for_each(print_change);
            }
            if !report.non_breaking_changes.is_empty() {
                println!("\n{}", "Non-breaking changes:".green().bold());
                report.non_breaking_changes.iter().for_each(print_change);
            }

            println!("\n{}", "Summary:".bold());
            println!("  Total changes: {}", report.total_changes);
            println!(
                "  Risk:          {} ({})",
                risk_color(report.risk_level),
                report.risk_score
            );
            println!("  {}", report.summary);
            println!("{}", "═".repeat(60));
            Ok(())
        }
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
