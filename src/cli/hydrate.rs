//! The hydrate run: load applications, hydrate them, report.

use crate::application::load_applications;
use crate::config::HydrateConfig;
use crate::core::HydrateError;
use crate::helm::HelmCli;
use crate::hydrate::{HydrationReport, OutcomeStatus, hydrate_all};
use anyhow::{Context, Result};
use colored::Colorize;

/// Hydrate every application named in the configured applications file.
///
/// # Errors
///
/// Fails if the applications file cannot be loaded, if `fail_fast` stops the
/// run, or with [`HydrateError::ApplicationsFailed`] when any application
/// failed.
pub fn run(config: &HydrateConfig, json: bool) -> Result<()> {
    let applications = load_applications(&config.applications_file)?;
    tracing::info!(
        "Found {} ArgoCD application(s) in {}",
        applications.len(),
        config.applications_file.display()
    );

    let engine = HelmCli::new(&config.helm_binary);
    let report = hydrate_all(&applications, config, &engine)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to serialize hydration report")?;
        println!("{rendered}");
    } else {
        print_summary(&report);
    }

    if report.has_failures() {
        let failed: Vec<&str> = report.failed_applications().collect();
        return Err(HydrateError::ApplicationsFailed {
            count: failed.len(),
            applications: failed.join(", "),
        }
        .into());
    }

    Ok(())
}

fn print_summary(report: &HydrationReport) {
    for outcome in &report.applications {
        match &outcome.status {
            OutcomeStatus::Written {
                files,
            } => println!(
                "{} {} ({} manifest(s))",
                "✓".green(),
                outcome.application,
                files.len()
            ),
            OutcomeStatus::Empty => {
                println!("{} {} (no manifests)", "-".yellow(), outcome.application);
            }
            OutcomeStatus::Failed {
                error,
            } => println!("{} {}: {}", "✗".red(), outcome.application, error),
        }
    }

    println!(
        "\n{} application(s) hydrated, {} failed, {} manifest(s) written",
        report.succeeded(),
        report.failed(),
        report.files_written()
    );
}
