//! Shared helpers for the integration tests.

use argocd_hydrate::test_utils::fixtures::{CHECKOUT_DEPLOYMENT, CHECKOUT_SERVICE};
use argocd_hydrate::test_utils::write_files;
use assert_cmd::Command;
use std::path::Path;

/// Environment variables that would leak host settings into a test run.
const ISOLATED_ENV: &[&str] = &[
    "HYDRATE_APPLICATIONS",
    "HYDRATE_OUTPUT",
    "HYDRATE_CHARTS_DIR",
    "HYDRATE_KUBE_VERSION",
    "HYDRATE_HELM",
    "RUST_LOG",
];

/// The binary, run inside `dir` with a clean environment.
pub fn hydrate_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("argocd-hydrate").unwrap();
    cmd.current_dir(dir);
    for var in ISOLATED_ENV {
        cmd.env_remove(var);
    }
    cmd
}

/// Lay out the `checkout` directory source under `root/apps/checkout`.
pub fn write_checkout_sources(root: &Path) {
    write_files(
        &root.join("apps/checkout"),
        &[("deployment.yaml", CHECKOUT_DEPLOYMENT), ("service.yaml", CHECKOUT_SERVICE)],
    )
    .unwrap();
}

/// Write `content` to the default applications file location under `root`.
pub fn write_applications(root: &Path, content: &str) {
    write_files(root, &[("manifests/applications.yaml", content)]).unwrap();
}
