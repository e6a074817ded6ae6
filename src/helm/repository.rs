//! Chart repository URL classification and transient repository registrations.
//!
//! Chart sources name their origin in `repoURL`. Two kinds of origin are
//! supported:
//!
//! - **OCI registries**, written either as `oci://registry/path` or as a bare
//!   `registry.example.com/path` whose host segment contains a dot.
//! - **HTTP(S) chart repositories** serving an `index.yaml`.
//!
//! HTTP repositories have to be registered with helm before a chart can be
//! pulled from them. [`RepositoryRegistration`] keeps that registration in a
//! private temporary directory instead of the user's helm configuration, so
//! nothing persists after the fetch.

use crate::constants::{MAX_REPO_NAME_LEN, OCI_SCHEME};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Kind of chart repository a `repoURL` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryKind {
    /// OCI registry; holds the full `oci://` base reference without the chart
    Oci(String),
    /// Classic HTTP(S) chart repository
    Http,
    /// Neither OCI nor HTTP(S)
    Unsupported,
}

impl RepositoryKind {
    /// Classify a repository URL.
    ///
    /// ```rust
    /// use argocd_hydrate::helm::RepositoryKind;
    ///
    /// assert_eq!(
    ///     RepositoryKind::classify("registry.example.com/charts"),
    ///     RepositoryKind::Oci("oci://registry.example.com/charts".to_string())
    /// );
    /// assert_eq!(RepositoryKind::classify("https://charts.example.com"), RepositoryKind::Http);
    /// assert_eq!(RepositoryKind::classify("localhost/charts"), RepositoryKind::Unsupported);
    /// ```
    #[must_use]
    pub fn classify(url: &str) -> Self {
        if is_oci_url(url) {
            if url.starts_with(OCI_SCHEME) {
                Self::Oci(url.to_string())
            } else {
                Self::Oci(format!("{OCI_SCHEME}{url}"))
            }
        } else if is_http_url(url) {
            Self::Http
        } else {
            Self::Unsupported
        }
    }
}

/// True if `url` denotes an OCI registry.
///
/// Either the `oci://` scheme is explicit, or there is no HTTP(S) scheme and
/// the first path segment looks like a host name (contains a dot).
#[must_use]
pub fn is_oci_url(url: &str) -> bool {
    if url.starts_with(OCI_SCHEME) {
        return true;
    }
    if is_http_url(url) {
        return false;
    }
    url.split('/').next().is_some_and(|host| host.contains('.'))
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Full OCI reference of `chart` under the registry base `base`.
#[must_use]
pub fn oci_chart_ref(base: &str, chart: &str) -> String {
    format!("{}/{chart}", base.trim_end_matches('/'))
}

/// Derive the helm repository name used for `url`.
///
/// `/`, `:` and `.` become `-`, the result is prefixed with `repo-` and cut
/// to 63 characters.
///
/// ```rust
/// use argocd_hydrate::helm::repository_name_for_url;
///
/// assert_eq!(
///     repository_name_for_url("https://charts.example.com"),
///     "repo-https---charts-example-com"
/// );
/// ```
#[must_use]
pub fn repository_name_for_url(url: &str) -> String {
    let sanitized: String = url
        .chars()
        .map(|c| match c {
            '/' | ':' | '.' => '-',
            other => other,
        })
        .collect();

    format!("repo-{sanitized}").chars().take(MAX_REPO_NAME_LEN).collect()
}

/// A helm repository registration that only lives as long as this value.
///
/// The repositories file and the index cache are created in a fresh
/// temporary directory. Dropping the registration deletes both, whether the
/// fetch that used it succeeded or not.
#[derive(Debug)]
pub struct RepositoryRegistration {
    name: String,
    url: String,
    dir: TempDir,
}

impl RepositoryRegistration {
    /// Prepare a registration for `url` in a new temporary directory.
    pub fn new(url: &str) -> Result<Self> {
        let name = repository_name_for_url(url);
        let dir = tempfile::Builder::new()
            .prefix("helm-repo-")
            .tempdir()
            .context("Failed to create temporary helm repository config")?;

        tracing::debug!(
            target: "helm",
            "Registering transient repository {} for {} in {}",
            name,
            url,
            dir.path().display()
        );

        Ok(Self {
            name,
            url: url.to_string(),
            dir,
        })
    }

    /// Repository name used in `helm repo add` and `<name>/<chart>` references.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Repository URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path of the private repositories file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join("repositories.yaml")
    }

    /// Directory holding downloaded repository indexes.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `<name>/<chart>` reference for pulling from this repository.
    #[must_use]
    pub fn chart_ref(&self, chart: &str) -> String {
        format!("{}/{chart}", self.name)
    }
}

impl Drop for RepositoryRegistration {
    fn drop(&mut self) {
        tracing::debug!(target: "helm", "Removing transient repository {}", self.name);
    }
}
