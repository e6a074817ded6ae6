//! Sample applications files and manifest trees.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Deployment used by the `checkout` fixtures.
pub const CHECKOUT_DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 2
  template:
    spec:
      containers:
        - name: web
          image: example/checkout:1.4.2
"#;

/// Service used by the `checkout` fixtures.
pub const CHECKOUT_SERVICE: &str = r#"---
apiVersion: v1
kind: Service
metadata:
  name: web
spec:
  ports:
    - port: 80
"#;

/// A sample applications file.
#[derive(Clone, Debug)]
pub struct ApplicationFixture {
    pub name: String,
    pub content: String,
}

impl ApplicationFixture {
    /// A single directory application named `checkout` reading from `path`.
    pub fn checkout(path: &str) -> Self {
        Self {
            name: "checkout".to_string(),
            content: format!(
                r#"apiVersion: argoproj.io/v1alpha1
kind: Application
metadata:
  name: checkout
spec:
  destination:
    namespace: shop
  source:
    path: {path}
    directory:
      recurse: false
"#
            ),
        }
    }

    /// A chart application using a values reference and a values file.
    pub fn chart(repo_url: &str, values_file: &str) -> Self {
        Self {
            name: "ingress".to_string(),
            content: format!(
                r#"apiVersion: argoproj.io/v1alpha1
kind: Application
metadata:
  name: ingress
spec:
  destination:
    namespace: ingress-nginx
  sources:
    - repoURL: {repo_url}
      chart: ingress-nginx
      targetRevision: 4.11.3
      helm:
        releaseName: edge
        valueFiles:
          - $values/{values_file}
    - repoURL: https://github.com/example/platform-config.git
      targetRevision: main
      ref: values
"#
            ),
        }
    }

    /// An application whose only source matches no supported kind.
    pub fn unsupported() -> Self {
        Self {
            name: "legacy".to_string(),
            content: r#"apiVersion: argoproj.io/v1alpha1
kind: Application
metadata:
  name: legacy
spec:
  source:
    repoURL: https://github.com/example/legacy.git
    path: deploy
    targetRevision: main
"#
            .to_string(),
        }
    }

    /// Join several fixtures into one multi-document file.
    pub fn combine(fixtures: &[Self]) -> String {
        fixtures.iter().map(|f| format!("---\n{}", f.content)).collect::<Vec<_>>().join("")
    }
}

/// Create `files` (relative path, content) under `root`, with parent directories.
pub fn write_files(root: &Path, files: &[(&str, &str)]) -> Result<()> {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
