//! Recording [`ChartEngine`] for tests.

use crate::core::HydrateError;
use crate::helm::{ChartEngine, RenderRequest, RepositoryRegistration};
use anyhow::{Context, Result};
use serde_yaml::Mapping;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// One call received by a [`MockChartEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    /// `pull_oci`
    PullOci {
        chart_ref: String,
        version: String,
        dest: PathBuf,
    },
    /// `add_repository`
    AddRepository { name: String, url: String },
    /// `update_repository_index`
    UpdateRepositoryIndex { name: String },
    /// `pull_from_repository`
    PullFromRepository {
        name: String,
        chart: String,
        version: String,
        dest: PathBuf,
    },
    /// `render`
    Render {
        chart_path: PathBuf,
        release_name: String,
        namespace: String,
        version: String,
        kube_version: String,
        values: Mapping,
    },
}

/// A [`ChartEngine`] that records every call and never runs helm.
///
/// Pulls succeed by creating `<dest>/<chart>/Chart.yaml`, so the chart cache
/// behaves as it would after a real pull. Renders return the configured
/// output, or fail with the configured error.
#[derive(Debug, Default)]
pub struct MockChartEngine {
    calls: RefCell<Vec<EngineCall>>,
    registration_roots: RefCell<Vec<PathBuf>>,
    render_output: String,
    render_error: Option<HydrateError>,
    pull_error: Option<String>,
    chart_kube_version: Option<String>,
}

impl MockChartEngine {
    /// Engine whose renders return empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` from every render.
    #[must_use]
    pub fn with_render_output(mut self, output: impl Into<String>) -> Self {
        self.render_output = output.into();
        self
    }

    /// Fail every render with `error`.
    #[must_use]
    pub fn with_render_error(mut self, error: HydrateError) -> Self {
        self.render_error = Some(error);
        self
    }

    /// Fail every chart pull with a helm error carrying `stderr`.
    #[must_use]
    pub fn with_pull_error(mut self, stderr: impl Into<String>) -> Self {
        self.pull_error = Some(stderr.into());
        self
    }

    /// Write `kubeVersion` into the `Chart.yaml` of pulled charts.
    #[must_use]
    pub fn with_chart_kube_version(mut self, constraint: impl Into<String>) -> Self {
        self.chart_kube_version = Some(constraint.into());
        self
    }

    /// Calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    /// Number of render calls received so far.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.calls.borrow().iter().filter(|call| matches!(call, EngineCall::Render { .. })).count()
    }

    /// Temporary directories of the repository registrations seen so far.
    #[must_use]
    pub fn registration_roots(&self) -> Vec<PathBuf> {
        self.registration_roots.borrow().clone()
    }

    fn record(&self, call: EngineCall) {
        self.calls.borrow_mut().push(call);
    }

    fn unpack(&self, chart: &str, version: &str, dest: &Path) -> Result<()> {
        if let Some(stderr) = &self.pull_error {
            return Err(HydrateError::HelmCommandError {
                operation: "pull".to_string(),
                stderr: stderr.clone(),
            }
            .into());
        }

        let chart_dir = dest.join(chart);
        std::fs::create_dir_all(&chart_dir)
            .with_context(|| format!("Failed to create {}", chart_dir.display()))?;

        let mut chart_yaml = format!("apiVersion: v2\nname: {chart}\nversion: {version}\n");
        if let Some(constraint) = &self.chart_kube_version {
            chart_yaml.push_str(&format!("kubeVersion: \"{constraint}\"\n"));
        }
        std::fs::write(chart_dir.join("Chart.yaml"), chart_yaml)
            .with_context(|| format!("Failed to write Chart.yaml in {}", chart_dir.display()))?;
        Ok(())
    }
}

impl ChartEngine for MockChartEngine {
    fn pull_oci(&self, chart_ref: &str, version: &str, dest: &Path) -> Result<()> {
        self.record(EngineCall::PullOci {
            chart_ref: chart_ref.to_string(),
            version: version.to_string(),
            dest: dest.to_path_buf(),
        });
        let chart = chart_ref.rsplit('/').next().unwrap_or(chart_ref);
        self.unpack(chart, version, dest)
    }

    fn add_repository(&self, repo: &RepositoryRegistration) -> Result<()> {
        self.registration_roots.borrow_mut().push(repo.root().to_path_buf());
        self.record(EngineCall::AddRepository {
            name: repo.name().to_string(),
            url: repo.url().to_string(),
        });
        Ok(())
    }

    fn update_repository_index(&self, repo: &RepositoryRegistration) -> Result<()> {
        self.record(EngineCall::UpdateRepositoryIndex {
            name: repo.name().to_string(),
        });
        Ok(())
    }

    fn pull_from_repository(
        &self,
        repo: &RepositoryRegistration,
        chart: &str,
        version: &str,
        dest: &Path,
    ) -> Result<()> {
        self.record(EngineCall::PullFromRepository {
            name: repo.name().to_string(),
            chart: chart.to_string(),
            version: version.to_string(),
            dest: dest.to_path_buf(),
        });
        self.unpack(chart, version, dest)
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<String> {
        self.record(EngineCall::Render {
            chart_path: request.chart_path.to_path_buf(),
            release_name: request.release_name.to_string(),
            namespace: request.namespace.to_string(),
            version: request.version.to_string(),
            kube_version: request.kube_version.as_str().to_string(),
            values: request.values.clone(),
        });

        match &self.render_error {
            Some(error) => Err(error.clone().into()),
            None => Ok(self.render_output.clone()),
        }
    }
}
