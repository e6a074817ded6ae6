//! ArgoCD `Application` descriptor model.
//!
//! This module holds the in-memory form of the `Application` resources read from
//! the applications file, and the classification of their sources.
//!
//! # Sources
//!
//! An application either has a single `spec.source` or an ordered list in
//! `spec.sources`. Each [`Source`] is classified into a [`SourceKind`] once, by
//! [`Source::kind`], using a fixed priority:
//!
//! 1. `ref: values` → [`SourceKind::ValuesRef`] (stages values files, never rendered)
//! 2. non-empty `chart` → [`SourceKind::Chart`]
//! 3. a `directory` block → [`SourceKind::Directory`]
//! 4. anything else → [`SourceKind::Unrecognized`]
//!
//! # Example
//!
//! ```rust
//! use argocd_hydrate::application::{Application, SourceKind};
//!
//! let app: Application = serde_yaml::from_str(r#"
//! apiVersion: argoproj.io/v1alpha1
//! kind: Application
//! metadata:
//!   name: guestbook
//! spec:
//!   source:
//!     repoURL: https://charts.example.com
//!     chart: guestbook
//!     targetRevision: 1.2.0
//! "#).unwrap();
//!
//! assert_eq!(app.effective_namespace(), "guestbook");
//! assert!(matches!(app.sources()[0].kind(), SourceKind::Chart(_)));
//! ```

pub mod loader;

pub use loader::load_applications;

use crate::constants::VALUES_REF;
use serde::{Deserialize, Serialize};

/// An ArgoCD `Application` resource.
///
/// Only the fields the hydration pipeline reads are modelled; everything else
/// in the document is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// API version, e.g. `argoproj.io/v1alpha1`
    #[serde(default)]
    pub api_version: String,

    /// Resource kind, `Application` for documents the loader keeps
    #[serde(default)]
    pub kind: String,

    /// Resource metadata
    #[serde(default)]
    pub metadata: ApplicationMetadata,

    /// Application spec
    #[serde(default)]
    pub spec: ApplicationSpec,
}

/// Metadata of an [`Application`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationMetadata {
    /// Application name, used as identity, default namespace and release name
    #[serde(default)]
    pub name: String,
}

/// Spec of an [`Application`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationSpec {
    /// Deployment destination
    #[serde(default)]
    pub destination: Destination,

    /// Single source form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    /// Multi-source form
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

/// Deployment destination of an [`Application`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Destination {
    /// Target namespace; empty means "same as the application name"
    #[serde(default)]
    pub namespace: String,
}

/// One content source of an [`Application`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Chart repository or git URL
    #[serde(default, rename = "repoURL")]
    pub repo_url: String,

    /// Chart name for Helm sources
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chart: String,

    /// Chart version or git revision
    #[serde(default)]
    pub target_revision: String,

    /// Directory path for directory sources
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Reference name; `values` marks a values-only source
    #[serde(default, rename = "ref", skip_serializing_if = "String::is_empty")]
    pub reference: String,

    /// Helm-specific settings
    #[serde(default, skip_serializing_if = "HelmSource::is_empty")]
    pub helm: HelmSource,

    /// Directory-specific settings; presence marks a directory source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<DirectorySource>,
}

/// Helm-specific settings of a [`Source`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HelmSource {
    /// Release name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_name: String,

    /// Values files, merged in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_files: Vec<String>,

    /// Inline values as a YAML string, merged after the values files
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub values: String,
}

impl HelmSource {
    fn is_empty(&self) -> bool {
        self.release_name.is_empty() && self.value_files.is_empty() && self.values.is_empty()
    }
}

/// Directory-specific settings of a [`Source`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectorySource {
    /// Include files from subdirectories
    #[serde(default)]
    pub recurse: bool,
}

/// Classified view of a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind<'a> {
    /// `ref: values` source, only stages values files for other sources
    ValuesRef,
    /// Helm chart source
    Chart(ChartSource<'a>),
    /// Plain directory of manifests
    Directory(DirectoryTarget<'a>),
    /// Matches no supported kind
    Unrecognized,
}

/// Fields of a chart source, borrowed from the [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSource<'a> {
    /// Repository origin
    pub repo_url: &'a str,
    /// Chart name
    pub chart: &'a str,
    /// Chart version
    pub version: &'a str,
    /// Helm settings
    pub helm: &'a HelmSource,
}

impl ChartSource<'_> {
    /// Release name override if set, else the application name.
    #[must_use]
    pub fn release_name<'n>(&'n self, app_name: &'n str) -> &'n str {
        if self.helm.release_name.is_empty() {
            app_name
        } else {
            &self.helm.release_name
        }
    }
}

/// Fields of a directory source, borrowed from the [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryTarget<'a> {
    /// Directory to collect manifests from
    pub path: &'a str,
    /// Whether subdirectories are included
    pub recurse: bool,
}

impl Source {
    /// Classify this source. See the [module docs](self) for the priority order.
    #[must_use]
    pub fn kind(&self) -> SourceKind<'_> {
        if self.is_values_ref() {
            return SourceKind::ValuesRef;
        }

        if !self.chart.is_empty() {
            return SourceKind::Chart(ChartSource {
                repo_url: &self.repo_url,
                chart: &self.chart,
                version: &self.target_revision,
                helm: &self.helm,
            });
        }

        if let Some(directory) = &self.directory {
            return SourceKind::Directory(DirectoryTarget {
                path: &self.path,
                recurse: directory.recurse,
            });
        }

        SourceKind::Unrecognized
    }

    /// True for `ref: values` sources.
    #[must_use]
    pub fn is_values_ref(&self) -> bool {
        self.reference == VALUES_REF
    }
}

impl Application {
    /// Application name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Destination namespace, defaulting to the application name.
    #[must_use]
    pub fn effective_namespace(&self) -> &str {
        if self.spec.destination.namespace.is_empty() {
            &self.metadata.name
        } else {
            &self.spec.destination.namespace
        }
    }

    /// All sources in order. A single `spec.source` takes precedence over `spec.sources`.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        match &self.spec.source {
            Some(source) => std::slice::from_ref(source),
            None => &self.spec.sources,
        }
    }
}
