//! Getting charts into the local chart cache.
//!
//! Charts are unpacked to `<charts_dir>/<version>/<chart>`. If that directory
//! already exists the chart is used as is; there is no integrity check and no
//! expiry.

use super::repository::{RepositoryKind, RepositoryRegistration, oci_chart_ref};
use super::ChartEngine;
use crate::core::HydrateError;
use crate::utils::ensure_dir;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Make `chart` at `version` from `repo_url` available locally.
///
/// Returns the unpacked chart directory.
///
/// # Errors
///
/// - [`HydrateError::UnsupportedRepositoryUrl`] if `repo_url` is neither OCI
///   nor HTTP(S)
/// - [`HydrateError::ChartPullFailed`] if the cache directory cannot be
///   created or the engine fails to fetch the chart
/// - [`HydrateError::HelmNotFound`] if the engine cannot run at all
pub fn pull_chart(
    engine: &dyn ChartEngine,
    charts_dir: &Path,
    repo_url: &str,
    chart: &str,
    version: &str,
) -> Result<PathBuf> {
    let failed = |err: anyhow::Error| pull_failed(err, chart, version, repo_url);

    ensure_dir(charts_dir).map_err(failed)?;

    let version_dir = charts_dir.join(version);
    let chart_path = version_dir.join(chart);
    if chart_path.exists() {
        tracing::info!(
            target: "helm",
            "Chart {} version {} already exists in {}, skipping download",
            chart,
            version,
            version_dir.display()
        );
        return Ok(chart_path);
    }

    ensure_dir(&version_dir).map_err(failed)?;

    match RepositoryKind::classify(repo_url) {
        RepositoryKind::Oci(base) => {
            let chart_ref = oci_chart_ref(&base, chart);
            tracing::info!(target: "helm", "Pulling chart {} version {}", chart_ref, version);
            engine.pull_oci(&chart_ref, version, &version_dir).map_err(failed)?;
        }
        RepositoryKind::Http => {
            tracing::info!(
                target: "helm",
                "Pulling chart {} version {} from {}",
                chart,
                version,
                repo_url
            );
            pull_from_http_repository(engine, repo_url, chart, version, &version_dir)
                .map_err(failed)?;
        }
        RepositoryKind::Unsupported => {
            return Err(HydrateError::UnsupportedRepositoryUrl {
                url: repo_url.to_string(),
            }
            .into());
        }
    }

    if !chart_path.exists() {
        return Err(failed(anyhow::anyhow!(
            "chart directory {} not found after pull",
            chart_path.display()
        )));
    }

    tracing::info!(
        target: "helm",
        "Successfully pulled chart {} version {} to {}",
        chart,
        version,
        version_dir.display()
    );

    Ok(chart_path)
}

/// Register `repo_url` transiently, refresh its index and pull from it.
///
/// The registration is dropped on every path out of this function.
fn pull_from_http_repository(
    engine: &dyn ChartEngine,
    repo_url: &str,
    chart: &str,
    version: &str,
    dest: &Path,
) -> Result<()> {
    let registration = RepositoryRegistration::new(repo_url)?;

    engine.add_repository(&registration)?;
    engine.update_repository_index(&registration)?;
    engine.pull_from_repository(&registration, chart, version, dest)
}

fn pull_failed(err: anyhow::Error, chart: &str, version: &str, url: &str) -> anyhow::Error {
    let reason = match err.downcast_ref::<HydrateError>() {
        Some(HydrateError::HelmNotFound) => return err,
        Some(HydrateError::HelmCommandError {
            stderr,
            ..
        }) => stderr.trim().to_string(),
        _ => format!("{err:#}"),
    };

    HydrateError::ChartPullFailed {
        chart: chart.to_string(),
        version: version.to_string(),
        url: url.to_string(),
        reason,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{EngineCall, MockChartEngine};
    use tempfile::TempDir;

    #[test]
    fn test_cache_hit_skips_engine() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("1.0.0/nginx")).unwrap();
        let engine = MockChartEngine::new();

        let path =
            pull_chart(&engine, temp.path(), "https://charts.example.com", "nginx", "1.0.0").unwrap();

        assert_eq!(path, temp.path().join("1.0.0/nginx"));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_oci_pull_uses_full_reference() {
        let temp = TempDir::new().unwrap();
        let engine = MockChartEngine::new();

        let path = pull_chart(&engine, temp.path(), "ghcr.io/org/charts", "app", "2.1.0").unwrap();

        assert!(path.ends_with("2.1.0/app"));
        assert_eq!(
            engine.calls(),
            vec![EngineCall::PullOci {
                chart_ref: "oci://ghcr.io/org/charts/app".to_string(),
                version: "2.1.0".to_string(),
                dest: temp.path().join("2.1.0"),
            }]
        );
    }

    #[test]
    fn test_http_pull_registers_transient_repository() {
        let temp = TempDir::new().unwrap();
        let engine = MockChartEngine::new();

        pull_chart(&engine, temp.path(), "https://charts.example.com", "nginx", "1.0.0").unwrap();

        let name = "repo-https---charts-example-com".to_string();
        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::AddRepository {
                    name: name.clone(),
                    url: "https://charts.example.com".to_string(),
                },
                EngineCall::UpdateRepositoryIndex {
                    name: name.clone(),
                },
                EngineCall::PullFromRepository {
                    name,
                    chart: "nginx".to_string(),
                    version: "1.0.0".to_string(),
                    dest: temp.path().join("1.0.0"),
                },
            ]
        );
        for root in engine.registration_roots() {
            assert!(!root.exists(), "registration {} was not removed", root.display());
        }
    }

    #[test]
    fn test_failed_pull_still_removes_registration() {
        let temp = TempDir::new().unwrap();
        let engine = MockChartEngine::new().with_pull_error("chart not found");

        let err = pull_chart(&engine, temp.path(), "https://charts.example.com", "nginx", "9.9.9")
            .unwrap_err();

        match err.downcast_ref::<HydrateError>() {
            Some(HydrateError::ChartPullFailed {
                reason,
                ..
            }) => assert!(reason.contains("chart not found")),
            other => panic!("unexpected error: {other:?}"),
        }
        let roots = engine.registration_roots();
        assert_eq!(roots.len(), 1);
        assert!(!roots[0].exists());
    }

    #[test]
    fn test_unsupported_repository_url() {
        let temp = TempDir::new().unwrap();
        let engine = MockChartEngine::new();

        let err = pull_chart(&engine, temp.path(), "charts", "nginx", "1.0.0").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<HydrateError>(),
            Some(HydrateError::UnsupportedRepositoryUrl { .. })
        ));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_creates_missing_charts_dir() {
        let temp = TempDir::new().unwrap();
        let charts_dir = temp.path().join("nested/cache");
        let engine = MockChartEngine::new();

        pull_chart(&engine, &charts_dir, "oci://ghcr.io/org", "app", "1.0.0").unwrap();

        assert!(charts_dir.join("1.0.0/app").is_dir());
    }
}
