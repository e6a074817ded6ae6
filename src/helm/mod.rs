//! Helm chart fetching and rendering.
//!
//! The hydration pipeline never talks to `helm` directly. It goes through the
//! [`ChartEngine`] trait, whose operations mirror the steps of getting a chart
//! onto disk and turning it into manifests:
//!
//! 1. [`ChartEngine::pull_oci`] for OCI registries, or
//! 2. [`ChartEngine::add_repository`], [`ChartEngine::update_repository_index`]
//!    and [`ChartEngine::pull_from_repository`] for HTTP(S) repositories
//! 3. [`ChartEngine::render`] to run the templates
//!
//! [`HelmCli`] implements the trait by running the `helm` executable through
//! [`HelmCommand`]. Tests substitute a recording engine.
//!
//! # Modules
//!
//! - [`command_builder`] - builder for `helm` invocations
//! - [`kube_version`] - validated Kubernetes version
//! - [`pull`] - chart cache lookup and fetch dispatch
//! - [`repository`] - repository URL classification and transient registrations

pub mod command_builder;
pub mod kube_version;
pub mod pull;
pub mod repository;

pub use command_builder::{HelmCommand, HelmCommandOutput};
pub use kube_version::KubeVersion;
pub use pull::pull_chart;
pub use repository::{
    RepositoryKind, RepositoryRegistration, is_oci_url, oci_chart_ref, repository_name_for_url,
};

use crate::core::HydrateError;
use crate::utils::read_yaml_file;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::Mapping;
use std::io::Write;
use std::path::Path;

/// Everything needed to render one chart.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    /// Unpacked chart directory
    pub chart_path: &'a Path,
    /// Helm release name
    pub release_name: &'a str,
    /// Namespace the release is rendered into
    pub namespace: &'a str,
    /// Chart version
    pub version: &'a str,
    /// Kubernetes version exposed to the templates
    pub kube_version: &'a KubeVersion,
    /// Merged values
    pub values: &'a Mapping,
}

/// Operations the pipeline needs from a chart tool.
///
/// All operations block until complete.
pub trait ChartEngine {
    /// Pull `chart_ref` (a full `oci://` reference) at `version` and unpack it
    /// into `dest`.
    fn pull_oci(&self, chart_ref: &str, version: &str, dest: &Path) -> Result<()>;

    /// Register the repository described by `repo`.
    fn add_repository(&self, repo: &RepositoryRegistration) -> Result<()>;

    /// Download the index of a registered repository.
    fn update_repository_index(&self, repo: &RepositoryRegistration) -> Result<()>;

    /// Pull `chart` at `version` from a registered repository and unpack it
    /// into `dest`.
    fn pull_from_repository(
        &self,
        repo: &RepositoryRegistration,
        chart: &str,
        version: &str,
        dest: &Path,
    ) -> Result<()>;

    /// Render a chart and return its multi-document output.
    ///
    /// # Errors
    ///
    /// - [`HydrateError::KubeVersionMismatch`] when the chart rejects the
    ///   requested Kubernetes version
    /// - [`HydrateError::ChartRenderFailed`] for any other render failure
    fn render(&self, request: &RenderRequest<'_>) -> Result<String>;
}

/// [`ChartEngine`] backed by the `helm` executable.
#[derive(Debug, Clone)]
pub struct HelmCli {
    binary: String,
}

impl HelmCli {
    /// Use `binary` as the helm executable.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> HelmCommand {
        HelmCommand::new(&self.binary)
    }
}

impl ChartEngine for HelmCli {
    fn pull_oci(&self, chart_ref: &str, version: &str, dest: &Path) -> Result<()> {
        self.command()
            .args(["pull", chart_ref, "--version", version, "--untar", "--untardir"])
            .path_arg(dest)
            .with_context(chart_ref)
            .execute_success()
    }

    fn add_repository(&self, repo: &RepositoryRegistration) -> Result<()> {
        self.command()
            .args(["repo", "add", repo.name(), repo.url(), "--force-update"])
            .arg("--repository-config")
            .path_arg(repo.config_file())
            .arg("--repository-cache")
            .path_arg(repo.cache_dir())
            .with_context(repo.name())
            .execute_success()
    }

    fn update_repository_index(&self, repo: &RepositoryRegistration) -> Result<()> {
        self.command()
            .args(["repo", "update", repo.name()])
            .arg("--repository-config")
            .path_arg(repo.config_file())
            .arg("--repository-cache")
            .path_arg(repo.cache_dir())
            .with_context(repo.name())
            .execute_success()
    }

    fn pull_from_repository(
        &self,
        repo: &RepositoryRegistration,
        chart: &str,
        version: &str,
        dest: &Path,
    ) -> Result<()> {
        let chart_ref = repo.chart_ref(chart);
        self.command()
            .args(["pull", chart_ref.as_str(), "--version", version, "--untar", "--untardir"])
            .path_arg(dest)
            .arg("--repository-config")
            .path_arg(repo.config_file())
            .arg("--repository-cache")
            .path_arg(repo.cache_dir())
            .with_context(repo.name())
            .execute_success()
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<String> {
        let mut values_file = tempfile::Builder::new()
            .prefix("values-")
            .suffix(".yaml")
            .tempfile()
            .context("Failed to create temporary values file")?;
        let values =
            serde_yaml::to_string(request.values).context("Failed to serialize chart values")?;
        values_file.write_all(values.as_bytes()).context("Failed to write chart values")?;

        let chart = request.chart_path.display().to_string();
        let result = self
            .command()
            .args(["template", request.release_name])
            .path_arg(request.chart_path)
            .args(["--namespace", request.namespace])
            .args(["--version", request.version])
            .args(["--kube-version", request.kube_version.as_str()])
            .arg("--include-crds")
            .arg("--values")
            .path_arg(values_file.path())
            .with_context(request.release_name)
            .execute_stdout();

        result.map_err(|err| match err.downcast::<HydrateError>() {
            Ok(HydrateError::HelmCommandError {
                stderr,
                ..
            }) if stderr.contains("kubeVersion") => HydrateError::KubeVersionMismatch {
                chart,
                kube_version: request.kube_version.as_str().to_string(),
                stderr,
            }
            .into(),
            Ok(HydrateError::HelmCommandError {
                stderr,
                ..
            }) => HydrateError::ChartRenderFailed {
                chart,
                reason: stderr.trim().to_string(),
            }
            .into(),
            Ok(other) => other.into(),
            Err(err) => err,
        })
    }
}

/// The parts of a chart's `Chart.yaml` the pipeline reports on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// Chart name
    #[serde(default)]
    pub name: String,
    /// Chart version
    #[serde(default)]
    pub version: String,
    /// Kubernetes version constraint declared by the chart
    #[serde(default)]
    pub kube_version: Option<String>,
}

impl ChartMetadata {
    /// Read `Chart.yaml` from an unpacked chart directory.
    pub fn load(chart_path: &Path) -> Result<Self> {
        read_yaml_file(&chart_path.join("Chart.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_chart_metadata_load() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("Chart.yaml"),
            "apiVersion: v2\nname: ingress-nginx\nversion: 4.11.3\nkubeVersion: \">=1.21.0-0\"\n",
        )
        .unwrap();

        let metadata = ChartMetadata::load(temp.path()).unwrap();
        assert_eq!(metadata.name, "ingress-nginx");
        assert_eq!(metadata.version, "4.11.3");
        assert_eq!(metadata.kube_version.as_deref(), Some(">=1.21.0-0"));
    }

    #[test]
    fn test_chart_metadata_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(ChartMetadata::load(temp.path()).is_err());
    }

    #[test]
    fn test_helm_cli_missing_binary() {
        let temp = TempDir::new().unwrap();
        let engine = HelmCli::new("definitely-not-helm-binary");

        let err = engine.pull_oci("oci://ghcr.io/org/app", "1.0.0", temp.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<HydrateError>(), Some(HydrateError::HelmNotFound)));
    }

    /// Write an executable `helm` stand-in that prints `stderr` and fails.
    #[cfg(unix)]
    fn failing_helm(dir: &Path, stderr: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("helm");
        std::fs::write(&script, format!("#!/bin/sh\necho '{stderr}' >&2\nexit 1\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.display().to_string()
    }

    #[cfg(unix)]
    fn render_with(binary: &str, chart_path: &Path) -> anyhow::Error {
        let kube_version = KubeVersion::parse("1.25.0").unwrap();
        let values = Mapping::new();
        let request = RenderRequest {
            chart_path,
            release_name: "edge",
            namespace: "ingress",
            version: "4.11.3",
            kube_version: &kube_version,
            values: &values,
        };
        HelmCli::new(binary).render(&request).unwrap_err()
    }

    #[cfg(unix)]
    #[test]
    fn test_render_kube_version_failure_is_mismatch() {
        let temp = TempDir::new().unwrap();
        let helm = failing_helm(
            temp.path(),
            "Error: chart requires kubeVersion: >=1.28.0-0 which is incompatible with Kubernetes v1.25.0",
        );

        let err = render_with(&helm, temp.path());

        match err.downcast_ref::<HydrateError>() {
            Some(HydrateError::KubeVersionMismatch {
                kube_version,
                stderr,
                ..
            }) => {
                assert_eq!(kube_version, "1.25.0");
                assert!(stderr.contains(">=1.28.0-0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_render_other_failure_is_render_failed() {
        let temp = TempDir::new().unwrap();
        let helm = failing_helm(temp.path(), "Error: template: web/templates/svc.yaml:3: bad");

        let err = render_with(&helm, temp.path());

        match err.downcast_ref::<HydrateError>() {
            Some(HydrateError::ChartRenderFailed {
                reason,
                ..
            }) => assert_eq!(reason, "Error: template: web/templates/svc.yaml:3: bad"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
