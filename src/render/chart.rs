//! Rendering Helm chart sources.

use crate::application::ChartSource;
use crate::config::HydrateConfig;
use crate::core::HydrateError;
use crate::helm::{ChartEngine, ChartMetadata, KubeVersion, RenderRequest, pull_chart};
use crate::render::values::merge_values;
use anyhow::Result;

/// Fetch, configure and render one chart source.
///
/// The configured Kubernetes version is validated before anything else, so
/// a malformed version never reaches the engine. The rendered text is
/// returned trimmed.
pub fn render_chart(
    config: &HydrateConfig,
    engine: &dyn ChartEngine,
    chart: ChartSource<'_>,
    app_name: &str,
    namespace: &str,
) -> Result<String> {
    let kube_version = KubeVersion::parse(&config.kube_version)?;
    let release_name = chart.release_name(app_name);

    let chart_path =
        pull_chart(engine, &config.charts_dir, chart.repo_url, chart.chart, chart.version)?;

    let values = merge_values(&chart.helm.value_files, &chart.helm.values)?;

    tracing::info!(
        target: "render",
        "Rendering chart {} version {} as release {} in namespace {} (Kubernetes {})",
        chart.chart,
        chart.version,
        release_name,
        namespace,
        kube_version
    );

    let request = RenderRequest {
        chart_path: &chart_path,
        release_name,
        namespace,
        version: chart.version,
        kube_version: &kube_version,
        values: &values,
    };

    match engine.render(&request) {
        Ok(output) => Ok(output.trim().to_string()),
        Err(err) => {
            if let Some(HydrateError::KubeVersionMismatch { .. }) = err.downcast_ref::<HydrateError>()
            {
                let declared = ChartMetadata::load(&chart_path)
                    .ok()
                    .and_then(|metadata| metadata.kube_version)
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::warn!(
                    target: "render",
                    "Chart {} requires Kubernetes {} but rendering used {}",
                    chart.chart,
                    declared,
                    kube_version.as_str()
                );
                tracing::warn!(
                    target: "render",
                    "Try using --kube-version to set a higher Kubernetes version"
                );
            }
            Err(err)
        }
    }
}
