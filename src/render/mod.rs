//! Turning application sources into rendered multi-document text.
//!
//! [`SourceRenderer::render`] classifies a [`Source`] and hands it to the
//! matching renderer:
//!
//! - chart sources to [`chart::render_chart`]
//! - directory sources to [`directory::collect_directory`]
//! - `ref: values` sources produce no text
//! - anything else is [`HydrateError::UnsupportedSource`]

pub mod chart;
pub mod directory;
pub mod values;

use crate::application::{Source, SourceKind};
use crate::config::HydrateConfig;
use crate::core::HydrateError;
use crate::helm::ChartEngine;
use anyhow::Result;

/// Renders the sources of applications with one configuration and engine.
#[derive(Clone, Copy)]
pub struct SourceRenderer<'a> {
    config: &'a HydrateConfig,
    engine: &'a dyn ChartEngine,
}

impl<'a> SourceRenderer<'a> {
    /// Create a renderer.
    pub fn new(config: &'a HydrateConfig, engine: &'a dyn ChartEngine) -> Self {
        Self {
            config,
            engine,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &'a HydrateConfig {
        self.config
    }

    /// Render one source of application `app_name` into `namespace`.
    ///
    /// # Errors
    ///
    /// [`HydrateError::UnsupportedSource`] for sources that match no supported
    /// kind, plus whatever the chart or directory renderer reports.
    pub fn render(&self, source: &Source, app_name: &str, namespace: &str) -> Result<String> {
        match source.kind() {
            SourceKind::ValuesRef => Ok(String::new()),
            SourceKind::Chart(chart) => {
                chart::render_chart(self.config, self.engine, chart, app_name, namespace)
            }
            SourceKind::Directory(target) => directory::collect_directory(target),
            SourceKind::Unrecognized => {
                match serde_yaml::to_string(source) {
                    Ok(yaml) => tracing::debug!(
                        target: "render",
                        "Unsupported source in application {}:\n{}",
                        app_name,
                        yaml
                    ),
                    Err(e) => tracing::debug!(
                        target: "render",
                        "Unsupported source in application {}: {:?} ({})",
                        app_name,
                        source,
                        e
                    ),
                }
                Err(HydrateError::UnsupportedSource {
                    application: app_name.to_string(),
                }
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{DirectorySource, HelmSource};
    use crate::test_utils::{MockChartEngine, write_files};
    use tempfile::TempDir;

    #[test]
    fn test_values_ref_renders_nothing() {
        let config = HydrateConfig::default();
        let engine = MockChartEngine::new();
        let renderer = SourceRenderer::new(&config, &engine);
        let source = Source {
            reference: "values".to_string(),
            chart: "ignored".to_string(),
            ..Default::default()
        };

        assert_eq!(renderer.render(&source, "app", "ns").unwrap(), "");
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_unrecognized_source_is_error() {
        let config = HydrateConfig::default();
        let engine = MockChartEngine::new();
        let renderer = SourceRenderer::new(&config, &engine);
        let source = Source {
            repo_url: "https://github.com/example/repo.git".to_string(),
            path: "deploy".to_string(),
            ..Default::default()
        };

        let err = renderer.render(&source, "legacy", "legacy").unwrap_err();
        match err.downcast_ref::<HydrateError>() {
            Some(HydrateError::UnsupportedSource {
                application,
            }) => assert_eq!(application, "legacy"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_directory_source_dispatch() {
        let temp = TempDir::new().unwrap();
        write_files(temp.path(), &[("cm.yaml", "kind: ConfigMap\n")]).unwrap();
        let config = HydrateConfig::default();
        let engine = MockChartEngine::new();
        let renderer = SourceRenderer::new(&config, &engine);
        let source = Source {
            path: temp.path().display().to_string(),
            directory: Some(DirectorySource::default()),
            ..Default::default()
        };

        assert_eq!(renderer.render(&source, "app", "ns").unwrap(), "---\nkind: ConfigMap");
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_chart_source_dispatch() {
        let temp = TempDir::new().unwrap();
        let config = HydrateConfig {
            charts_dir: temp.path().to_path_buf(),
            ..Default::default()
        };
        let engine = MockChartEngine::new().with_render_output("kind: Secret\n");
        let renderer = SourceRenderer::new(&config, &engine);
        let source = Source {
            repo_url: "oci://ghcr.io/org".to_string(),
            chart: "vault".to_string(),
            target_revision: "0.28.0".to_string(),
            helm: HelmSource::default(),
            path: "ignored".to_string(),
            directory: Some(DirectorySource::default()),
            ..Default::default()
        };

        assert_eq!(renderer.render(&source, "vault", "vault").unwrap(), "kind: Secret");
        assert_eq!(engine.render_count(), 1);
    }
}
