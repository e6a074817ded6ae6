//! Tests for the `argocd-hydrate` binary.

use crate::common::{hydrate_cmd, write_applications, write_checkout_sources};
use argocd_hydrate::test_utils::ApplicationFixture;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_hydrates_directory_application_with_defaults() {
    let temp = TempDir::new().unwrap();
    write_checkout_sources(temp.path());
    write_applications(temp.path(), &ApplicationFixture::checkout("apps/checkout").content);

    hydrate_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 application(s) hydrated, 0 failed, 2 manifest(s) written"))
        .stderr(predicate::str::contains("Found 1 ArgoCD application(s)"));

    let output = temp.path().join("manifests/checkout");
    let deployment = fs::read_to_string(output.join("deployment-web.yaml")).unwrap();
    assert!(deployment.starts_with("---\napiVersion: apps/v1\nkind: Deployment"));
    assert!(output.join("service-web.yaml").is_file());
}

#[test]
fn test_missing_applications_file() {
    let temp = TempDir::new().unwrap();

    hydrate_cmd(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Applications file manifests/applications.yaml not found"))
        .stderr(predicate::str::contains("--applications"));
}

#[test]
fn test_unsupported_source_fails_run_but_other_apps_are_written() {
    let temp = TempDir::new().unwrap();
    write_checkout_sources(temp.path());
    write_applications(
        temp.path(),
        &ApplicationFixture::combine(&[
            ApplicationFixture::unsupported(),
            ApplicationFixture::checkout("apps/checkout"),
        ]),
    );

    hydrate_cmd(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unsupported source type for application legacy"))
        .stderr(predicate::str::contains("Failed to hydrate 1 application(s): legacy"));

    assert!(temp.path().join("manifests/checkout/deployment-web.yaml").is_file());
    assert!(!temp.path().join("manifests/legacy").exists());
}

#[test]
fn test_fail_fast_stops_at_first_failure() {
    let temp = TempDir::new().unwrap();
    write_checkout_sources(temp.path());
    write_applications(
        temp.path(),
        &ApplicationFixture::combine(&[
            ApplicationFixture::unsupported(),
            ApplicationFixture::checkout("apps/checkout"),
        ]),
    );

    hydrate_cmd(temp.path())
        .arg("--fail-fast")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported source type for application legacy"));

    assert!(!temp.path().join("manifests/checkout").exists());
}

#[test]
fn test_no_fail_fast_overrides_config_file() {
    let temp = TempDir::new().unwrap();
    write_checkout_sources(temp.path());
    write_applications(
        temp.path(),
        &ApplicationFixture::combine(&[
            ApplicationFixture::unsupported(),
            ApplicationFixture::checkout("apps/checkout"),
        ]),
    );
    fs::write(temp.path().join("hydrate.toml"), "fail_fast = true\n").unwrap();

    hydrate_cmd(temp.path())
        .args(["--config", "hydrate.toml", "--no-fail-fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to hydrate 1 application(s): legacy"));

    assert!(temp.path().join("manifests/checkout/deployment-web.yaml").is_file());
}

#[test]
fn test_invalid_kube_version_never_touches_chart_cache() {
    let temp = TempDir::new().unwrap();
    write_applications(
        temp.path(),
        &ApplicationFixture::chart("https://kubernetes.github.io/ingress-nginx", "values/ingress.yaml")
            .content,
    );

    hydrate_cmd(temp.path())
        .args(["--kube-version", "abc", "--helm", "definitely-not-helm-binary"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid Kubernetes version format: abc"));

    assert!(!temp.path().join("cache").exists());
}

#[test]
fn test_missing_helm_is_reported() {
    let temp = TempDir::new().unwrap();
    write_applications(
        temp.path(),
        &ApplicationFixture::chart("https://kubernetes.github.io/ingress-nginx", "values/ingress.yaml")
            .content,
    );

    hydrate_cmd(temp.path())
        .args(["--helm", "definitely-not-helm-binary"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Helm is not installed or not found in PATH"));
}

#[test]
fn test_environment_variables_configure_run() {
    let temp = TempDir::new().unwrap();
    write_checkout_sources(temp.path());
    let applications = temp.path().join("deploy/apps.yaml");
    fs::create_dir_all(applications.parent().unwrap()).unwrap();
    fs::write(&applications, ApplicationFixture::checkout("apps/checkout").content).unwrap();

    hydrate_cmd(temp.path())
        .env("HYDRATE_APPLICATIONS", "deploy/apps.yaml")
        .env("HYDRATE_OUTPUT", "hydrated")
        .assert()
        .success();

    assert!(temp.path().join("hydrated/checkout/service-web.yaml").is_file());
}

#[test]
fn test_config_file_sets_output_dir() {
    let temp = TempDir::new().unwrap();
    write_checkout_sources(temp.path());
    write_applications(temp.path(), &ApplicationFixture::checkout("apps/checkout").content);
    fs::write(temp.path().join("hydrate.toml"), "output_dir = \"rendered\"\n").unwrap();

    hydrate_cmd(temp.path()).args(["--config", "hydrate.toml"]).assert().success();

    assert!(temp.path().join("rendered/checkout/deployment-web.yaml").is_file());
}

#[test]
fn test_json_report() {
    let temp = TempDir::new().unwrap();
    write_checkout_sources(temp.path());
    write_applications(temp.path(), &ApplicationFixture::checkout("apps/checkout").content);

    let output = hydrate_cmd(temp.path()).args(["--json", "--quiet"]).assert().success();

    let report: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(report["applications"][0]["application"], "checkout");
    assert_eq!(report["applications"][0]["status"], "written");
    assert_eq!(report["applications"][0]["files"].as_array().unwrap().len(), 2);
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let temp = TempDir::new().unwrap();

    hydrate_cmd(temp.path()).args(["--verbose", "--quiet"]).assert().failure();
}
