//! Hydrating applications into manifest files.
//!
//! The driver processes applications one at a time. For each one it renders
//! every source in order, splits the rendered text into
//! [`ManifestRecord`]s and writes one file per record to
//! `<output_dir>/<application>/<kind>-<name>.yaml`.
//!
//! A failing application is logged and recorded in the [`HydrationReport`];
//! the remaining applications are still processed unless
//! [`HydrateConfig::fail_fast`] is set.
//!
//! # Example
//!
//! ```rust,no_run
//! use argocd_hydrate::application::load_applications;
//! use argocd_hydrate::config::HydrateConfig;
//! use argocd_hydrate::helm::HelmCli;
//! use argocd_hydrate::hydrate::hydrate_all;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = HydrateConfig::default();
//! let applications = load_applications(&config.applications_file)?;
//! let engine = HelmCli::new(&config.helm_binary);
//!
//! let report = hydrate_all(&applications, &config, &engine)?;
//! println!("{} succeeded, {} failed", report.succeeded(), report.failed());
//! # Ok(())
//! # }
//! ```

use crate::application::Application;
use crate::config::HydrateConfig;
use crate::core::HydrateError;
use crate::helm::ChartEngine;
use crate::manifest::{ManifestNamer, ManifestRecord, sanitize_file_name, split_manifests};
use crate::render::SourceRenderer;
use crate::utils::{ensure_dir, remove_dir_all, safe_write};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of hydrating one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Manifests were written
    Written {
        /// Paths of the written files, in record order
        files: Vec<PathBuf>,
    },
    /// The application rendered no manifests; its output directory was removed
    Empty,
    /// Rendering or writing failed
    Failed {
        /// Error message including its cause chain
        error: String,
    },
}

/// Outcome of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationOutcome {
    /// Application name
    pub application: String,
    /// What happened
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Outcomes of a hydration run, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HydrationReport {
    /// One entry per processed application
    pub applications: Vec<ApplicationOutcome>,
}

impl HydrationReport {
    /// Applications that did not fail (written or empty).
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.applications.len() - self.failed()
    }

    /// Applications that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed_applications().count()
    }

    /// True if any application failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Names of the failed applications.
    pub fn failed_applications(&self) -> impl Iterator<Item = &str> {
        self.applications
            .iter()
            .filter(|outcome| matches!(outcome.status, OutcomeStatus::Failed { .. }))
            .map(|outcome| outcome.application.as_str())
    }

    /// Total number of manifest files written.
    #[must_use]
    pub fn files_written(&self) -> usize {
        self.applications
            .iter()
            .map(|outcome| match &outcome.status {
                OutcomeStatus::Written {
                    files,
                } => files.len(),
                _ => 0,
            })
            .sum()
    }
}

/// Render all sources of `app` into manifest records.
///
/// Records are returned in source order, and in document order within a
/// source. `ref: values` sources contribute nothing.
///
/// # Errors
///
/// The first source that fails to render or split fails the application.
pub fn hydrate_application(
    app: &Application,
    renderer: &SourceRenderer<'_>,
) -> Result<Vec<ManifestRecord>> {
    let name = app.name();
    let namespace = app.effective_namespace();
    let mut records = Vec::new();

    for (index, source) in app.sources().iter().enumerate() {
        if source.is_values_ref() {
            tracing::debug!(target: "hydrate", "Skipping values reference source {index} of {name}");
            continue;
        }

        let text = renderer
            .render(source, name, namespace)
            .with_context(|| format!("Failed to render source {index} of application {name}"))?;
        if text.trim().is_empty() {
            continue;
        }

        let manifests = split_manifests(&text)
            .with_context(|| format!("Failed to split output of source {index} of application {name}"))?;
        tracing::debug!(
            target: "hydrate",
            "Source {index} of {name} produced {} manifest(s)",
            manifests.len()
        );
        records.extend(manifests);
    }

    Ok(records)
}

/// Output directory of application `app_name` below `output_dir`.
///
/// # Errors
///
/// Returns [`HydrateError::InvalidApplicationName`] unless `app_name` is a
/// single non-empty path segment, so the directory can never be the output
/// root itself or lie outside it.
pub fn application_dir(output_dir: &Path, app_name: &str) -> Result<PathBuf> {
    let invalid = app_name.is_empty()
        || app_name == "."
        || app_name == ".."
        || app_name.contains(['/', '\\', ':', '\0']);
    if invalid {
        return Err(HydrateError::InvalidApplicationName {
            name: app_name.to_string(),
        }
        .into());
    }
    Ok(output_dir.join(app_name))
}

/// Write the records of application `app_name` below `output_dir`.
///
/// Any previous `<output_dir>/<app_name>` directory is removed first. Files
/// are named `<kind-lowercase>-<unique-name>.yaml`; names repeated within the
/// application get a numeric suffix.
///
/// # Errors
///
/// Fails for an invalid application name (see [`application_dir`]) or when a
/// file cannot be written.
pub fn write_manifests(
    output_dir: &Path,
    app_name: &str,
    records: &[ManifestRecord],
) -> Result<Vec<PathBuf>> {
    let app_dir = application_dir(output_dir, app_name)?;
    remove_dir_all(&app_dir)?;
    ensure_dir(&app_dir)?;

    let mut namer = ManifestNamer::new();
    let mut written = Vec::with_capacity(records.len());

    for record in records {
        let unique = namer.unique_name(record);
        let kind = sanitize_file_name(&record.kind.to_lowercase());
        let path = app_dir.join(format!("{kind}-{unique}.yaml"));
        safe_write(&path, &record.content)?;
        tracing::trace!(target: "hydrate", "Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Hydrate one application end to end.
fn process_application(
    app: &Application,
    renderer: &SourceRenderer<'_>,
) -> Result<OutcomeStatus> {
    let output_dir = &renderer.config().output_dir;
    let app_dir = application_dir(output_dir, app.name())?;

    let records = hydrate_application(app, renderer)?;

    if records.is_empty() {
        tracing::warn!(target: "hydrate", "No manifests generated for application {}", app.name());
        remove_dir_all(&app_dir)
            .with_context(|| format!("Failed to remove stale output of application {}", app.name()))?;
        return Ok(OutcomeStatus::Empty);
    }

    let files = write_manifests(output_dir, app.name(), &records)
        .with_context(|| format!("Failed to write manifests of application {}", app.name()))?;

    tracing::info!(
        target: "hydrate",
        "Successfully processed application {} ({} manifest(s))",
        app.name(),
        files.len()
    );

    Ok(OutcomeStatus::Written {
        files,
    })
}

/// Hydrate every application in `applications`.
///
/// # Errors
///
/// Only returns an error when `config.fail_fast` is set and an application
/// fails; otherwise failures are recorded in the report.
pub fn hydrate_all(
    applications: &[Application],
    config: &HydrateConfig,
    engine: &dyn ChartEngine,
) -> Result<HydrationReport> {
    let renderer = SourceRenderer::new(config, engine);
    let mut report = HydrationReport::default();

    for app in applications {
        tracing::info!(target: "hydrate", "Processing application {}", app.name());

        let status = match process_application(app, &renderer) {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(
                    target: "hydrate",
                    "Failed to process application {}: {:#}",
                    app.name(),
                    err
                );
                if config.fail_fast {
                    return Err(err.context(format!(
                        "Aborting after application {} failed (fail-fast)",
                        app.name()
                    )));
                }
                OutcomeStatus::Failed {
                    error: format!("{err:#}"),
                }
            }
        };

        report.applications.push(ApplicationOutcome {
            application: app.name().to_string(),
            status,
        });
    }

    Ok(report)
}
