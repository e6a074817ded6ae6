//! Full pipeline runs with the recording chart engine.

use argocd_hydrate::application::loader::parse_applications;
use argocd_hydrate::config::HydrateConfig;
use argocd_hydrate::hydrate::{OutcomeStatus, hydrate_all};
use argocd_hydrate::test_utils::{
    ApplicationFixture, EngineCall, MockChartEngine, init_test_logging, write_files,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RENDERED: &str = r#"---
# Source: ingress-nginx/templates/controller-configmap.yaml
apiVersion: v1
kind: ConfigMap
metadata:
  name: edge-controller
---
apiVersion: v1
kind: Service
metadata:
  name: edge-controller
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: edge-controller
---
apiVersion: batch/v1
kind: Job
metadata:
  generateName: edge-admission-
"#;

fn config(root: &Path) -> HydrateConfig {
    HydrateConfig {
        output_dir: root.join("out"),
        charts_dir: root.join("cache"),
        ..Default::default()
    }
}

#[test]
fn test_chart_application_end_to_end() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let values = temp.path().join("values/ingress.yaml");
    write_files(temp.path(), &[("values/ingress.yaml", "controller:\n  replicaCount: 3\n")]).unwrap();
    // `$values/` followed by an absolute path resolves to that path.
    let content =
        ApplicationFixture::chart("https://kubernetes.github.io/ingress-nginx", &values.display().to_string())
            .content;
    let applications = parse_applications(&content, Path::new("applications.yaml")).unwrap();
    let engine = MockChartEngine::new().with_render_output(RENDERED);

    let report = hydrate_all(&applications, &config(temp.path()), &engine).unwrap();

    assert!(!report.has_failures());
    let app_dir = temp.path().join("out/ingress");
    for name in [
        "configmap-edge-controller.yaml",
        "service-edge-controller.yaml",
        "configmap-edge-controller-1.yaml",
        "job-edge-admission-generated.yaml",
    ] {
        assert!(app_dir.join(name).is_file(), "{name} missing");
    }

    let calls = engine.calls();
    assert!(matches!(calls[0], EngineCall::AddRepository { .. }));
    match calls.last() {
        Some(EngineCall::Render {
            release_name,
            namespace,
            values,
            ..
        }) => {
            assert_eq!(release_name, "edge");
            assert_eq!(namespace, "ingress-nginx");
            assert!(values.contains_key("controller"));
        }
        other => panic!("expected render call, got {other:?}"),
    }
}

#[test]
fn test_second_run_uses_chart_cache() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let values = temp.path().join("values.yaml");
    fs::write(&values, "").unwrap();
    let content =
        ApplicationFixture::chart("oci://ghcr.io/example/charts", &values.display().to_string()).content;
    let applications = parse_applications(&content, Path::new("applications.yaml")).unwrap();
    let config = config(temp.path());

    let first = MockChartEngine::new().with_render_output(RENDERED);
    hydrate_all(&applications, &config, &first).unwrap();
    assert!(matches!(first.calls()[0], EngineCall::PullOci { .. }));

    let second = MockChartEngine::new().with_render_output(RENDERED);
    hydrate_all(&applications, &config, &second).unwrap();
    assert_eq!(second.calls().len(), 1);
    assert_eq!(second.render_count(), 1);
}

#[test]
fn test_empty_render_output_is_empty_outcome() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let values = temp.path().join("values.yaml");
    fs::write(&values, "").unwrap();
    let content =
        ApplicationFixture::chart("oci://ghcr.io/example/charts", &values.display().to_string()).content;
    let applications = parse_applications(&content, Path::new("applications.yaml")).unwrap();
    let engine = MockChartEngine::new().with_render_output("---\n# nothing here\n");

    let report = hydrate_all(&applications, &config(temp.path()), &engine).unwrap();

    assert_eq!(report.applications[0].status, OutcomeStatus::Empty);
    assert!(!temp.path().join("out/ingress").exists());
}
