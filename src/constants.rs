//! Global constants used throughout the hydration pipeline.
//!
//! Default configuration values, document conventions and Helm naming limits
//! live here so the modules that share them agree on a single definition.

/// Default path of the file holding the ArgoCD `Application` resources.
pub const DEFAULT_APPLICATIONS_FILE: &str = "manifests/applications.yaml";

/// Default directory that receives hydrated manifests.
pub const DEFAULT_OUTPUT_DIR: &str = "manifests";

/// Default directory used as the local chart cache.
pub const DEFAULT_CHARTS_DIR: &str = "cache";

/// Kubernetes version charts are rendered against unless configured otherwise.
pub const DEFAULT_KUBE_VERSION: &str = "1.31.1";

/// Fallback major version when the configured Kubernetes version is too short
/// to carry one.
pub const FALLBACK_KUBE_MAJOR: &str = "1";

/// Fallback minor version, see [`FALLBACK_KUBE_MAJOR`].
pub const FALLBACK_KUBE_MINOR: &str = "26";

/// YAML document separator.
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Suffix appended to `metadata.generateName` when a resource has no name.
pub const GENERATED_NAME_SUFFIX: &str = "generated";

/// `ref` value marking a source that only stages values files.
pub const VALUES_REF: &str = "values";

/// Prefix ArgoCD uses to point value files at the `ref: values` source.
pub const VALUES_REF_PREFIX: &str = "$values/";

/// Maximum length of a generated Helm repository name.
pub const MAX_REPO_NAME_LEN: usize = 63;

/// Scheme marking an OCI registry origin.
pub const OCI_SCHEME: &str = "oci://";

/// Extension of the files picked up from directory sources.
pub const YAML_EXTENSION: &str = ".yaml";

/// ArgoCD API group prefix for `Application` resources.
pub const ARGOCD_API_GROUP_PREFIX: &str = "argoproj.io/";
