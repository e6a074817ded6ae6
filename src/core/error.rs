//! Error handling for argocd-hydrate
//!
//! This module provides the error types and user-friendly error reporting for the
//! hydration pipeline. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`HydrateError`] - Enumerated error types for every failure case in the pipeline
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! Library functions return [`anyhow::Result`] and attach context with
//! `.with_context(..)`. When a caller needs to branch on a failure class it
//! downcasts to [`HydrateError`]:
//!
//! ```rust,no_run
//! use argocd_hydrate::core::HydrateError;
//!
//! fn is_version_mismatch(err: &anyhow::Error) -> bool {
//!     matches!(
//!         err.downcast_ref::<HydrateError>(),
//!         Some(HydrateError::KubeVersionMismatch { .. })
//!     )
//! }
//! ```
//!
//! # Error Categories
//!
//! - **Configuration/Input**: [`HydrateError::ApplicationsFileNotFound`],
//!   [`HydrateError::ApplicationsParseError`], [`HydrateError::UnsupportedSource`],
//!   [`HydrateError::InvalidKubeVersion`], [`HydrateError::ConfigError`]
//! - **External collaborators**: [`HydrateError::HelmNotFound`],
//!   [`HydrateError::HelmCommandError`], [`HydrateError::ChartPullFailed`],
//!   [`HydrateError::UnsupportedRepositoryUrl`], [`HydrateError::KubeVersionMismatch`],
//!   [`HydrateError::ChartRenderFailed`], [`HydrateError::InvalidDirectory`]
//! - **Data**: [`HydrateError::ValuesFileError`], [`HydrateError::ManifestParseError`]
//!
//! Use [`user_friendly_error`] to convert any error into a displayable
//! [`ErrorContext`].

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for hydration operations
///
/// Each variant carries the identifiers a user needs to locate the failing
/// input: application names, file paths, repository URLs or the failing
/// `helm` operation.
#[derive(Error, Debug, Clone)]
pub enum HydrateError {
    /// The applications file does not exist or cannot be read
    #[error("Applications file {path} not found")]
    ApplicationsFileNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The applications file is not valid YAML
    #[error("Failed to parse {path}: {reason}")]
    ApplicationsParseError {
        /// Path to the applications file
        path: String,
        /// Parser message
        reason: String,
    },

    /// A source matches none of the supported kinds
    ///
    /// Sources must either name a chart, carry a `directory` block, or be a
    /// `ref: values` source. Anything else aborts the owning application.
    #[error("Unsupported source type for application {application}")]
    UnsupportedSource {
        /// Name of the application owning the source
        application: String,
    },

    /// Configured Kubernetes version does not match `MAJOR.MINOR[.PATCH][-suffix]`
    #[error("Invalid Kubernetes version format: {version}. Expected format: X.Y.Z")]
    InvalidKubeVersion {
        /// The rejected version string
        version: String,
    },

    /// Chart repository URL is neither OCI nor HTTP(S)
    #[error("Unsupported repository URL format: {url}")]
    UnsupportedRepositoryUrl {
        /// The rejected URL
        url: String,
    },

    /// Downloading a chart failed
    #[error("Failed to pull chart {chart} (version {version}) from {url}: {reason}")]
    ChartPullFailed {
        /// Chart name
        chart: String,
        /// Requested chart version
        version: String,
        /// Repository the chart was pulled from
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// The `helm` executable is not available
    #[error("Helm is not installed or not found in PATH")]
    HelmNotFound,

    /// A `helm` invocation exited unsuccessfully
    #[error("Helm operation failed: {operation}")]
    HelmCommandError {
        /// The helm subcommand that failed (e.g. "pull", "template")
        operation: String,
        /// Error output of the command
        stderr: String,
    },

    /// The chart refuses to render for the configured Kubernetes version
    ///
    /// Detected from the render failure message mentioning `kubeVersion`.
    #[error("Chart {chart} does not support Kubernetes version {kube_version}")]
    KubeVersionMismatch {
        /// Chart path or name
        chart: String,
        /// Kubernetes version that was used for rendering
        kube_version: String,
        /// Engine output
        stderr: String,
    },

    /// Rendering a chart failed for any other reason
    #[error("Failed to render chart {chart}: {reason}")]
    ChartRenderFailed {
        /// Chart path or name
        chart: String,
        /// Engine output
        reason: String,
    },

    /// An application name that cannot be used as an output directory name
    ///
    /// Names must be a single, non-empty path segment other than `.` and `..`.
    #[error("Invalid application name {name:?}: must be a single non-empty path segment")]
    InvalidApplicationName {
        /// The name as written in `metadata.name`
        name: String,
    },

    /// A directory source points at something that is not a directory
    #[error("Invalid directory path: {path}")]
    InvalidDirectory {
        /// The configured path
        path: String,
    },

    /// A values file could not be read or is not a YAML mapping
    #[error("Failed to read values file {path}: {reason}")]
    ValuesFileError {
        /// Path of the values file after prefix stripping
        path: String,
        /// Why loading failed
        reason: String,
    },

    /// Rendered output contains a document that is not valid YAML
    #[error("Error parsing YAML document: {reason}")]
    ManifestParseError {
        /// Parser message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// One or more applications could not be hydrated
    #[error("Failed to hydrate {count} application(s): {applications}")]
    ApplicationsFailed {
        /// Number of failed applications
        count: usize,
        /// Comma-separated names of the failed applications
        applications: String,
    },

    /// File system error
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error wrapper carrying a suggestion and details for terminal display
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: HydrateError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: HydrateError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    ///
    /// Suggestions are displayed in green to draw attention.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes, in order:
/// - [`HydrateError`] anywhere in the chain, with tailored suggestions
/// - [`std::io::Error`] with filesystem guidance
/// - [`serde_yaml::Error`] with YAML syntax guidance
/// - anything else, rendered with its full cause chain
///
/// # Examples
///
/// ```rust,no_run
/// use argocd_hydrate::core::{HydrateError, user_friendly_error};
///
/// let error = anyhow::Error::from(HydrateError::HelmNotFound);
/// user_friendly_error(error).display();
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(hydrate_error) = error.chain().find_map(|e| e.downcast_ref::<HydrateError>()) {
        let ctx = create_error_context(hydrate_error.clone());
        let chain = cause_chain(&error);
        // Keep the outer context ("Failed to hydrate application x") visible
        // when the typed error sits deeper in the chain.
        if error.downcast_ref::<HydrateError>().is_none() && ctx.details.is_none() {
            return ctx.with_details(chain);
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(HydrateError::FileSystemError {
                    operation: "file access".to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the input and output directories")
                .with_details(io_error.to_string());
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(HydrateError::FileSystemError {
                    operation: "file access".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(io_error.to_string());
            }
            _ => {}
        }
    }

    if let Some(yaml_error) = error.downcast_ref::<serde_yaml::Error>() {
        return ErrorContext::new(HydrateError::Other {
            message: format!("YAML parsing error: {yaml_error}"),
        })
        .with_suggestion("Check the YAML syntax: indentation, quoting and document separators");
    }

    ErrorContext::new(HydrateError::Other {
        message: cause_chain(&error),
    })
}

fn cause_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

/// Map each [`HydrateError`] variant to an [`ErrorContext`] with suggestions.
fn create_error_context(error: HydrateError) -> ErrorContext {
    match &error {
        HydrateError::ApplicationsFileNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Pass the file with --applications or create manifests/applications.yaml"),

        HydrateError::ApplicationsParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the YAML syntax of the applications file. Each Application must be a separate document")
            .with_details("Documents are separated by lines containing only '---'"),

        HydrateError::UnsupportedSource { .. } => ErrorContext::new(error)
            .with_suggestion("Give the source a 'chart', a 'directory' block, or 'ref: values'")
            .with_details("Only Helm chart sources, directory sources and values references can be hydrated"),

        HydrateError::InvalidKubeVersion { .. } => ErrorContext::new(error)
            .with_suggestion("Use a version such as 1.31.1 or 1.30 with --kube-version"),

        HydrateError::UnsupportedRepositoryUrl { .. } => ErrorContext::new(error)
            .with_suggestion("Use an https:// chart repository URL or an OCI registry (oci://registry/path or registry.example.com/path)"),

        HydrateError::ChartPullFailed { url, .. } => {
            let suggestion = format!(
                "Verify the chart name and version exist in {url} and that the repository is reachable"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        HydrateError::HelmNotFound => ErrorContext::new(error)
            .with_suggestion("Install helm from https://helm.sh/docs/intro/install/ or point --helm at the executable")
            .with_details("Chart sources are fetched and rendered with the helm executable"),

        HydrateError::HelmCommandError { stderr, .. } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Run the helm command manually with --debug for more details")
                .with_details(details)
        }

        HydrateError::KubeVersionMismatch { stderr, .. } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Try using --kube-version to set a higher Kubernetes version")
                .with_details(details)
        }

        HydrateError::ChartRenderFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check the values files passed to the chart and the chart's own requirements"),

        HydrateError::InvalidApplicationName { .. } => ErrorContext::new(error)
            .with_suggestion("Set metadata.name to a plain name such as 'checkout'")
            .with_details("The name becomes a directory below the output directory"),

        HydrateError::InvalidDirectory { .. } => ErrorContext::new(error)
            .with_suggestion("Directory source paths are resolved from the current working directory"),

        HydrateError::ValuesFileError { .. } => ErrorContext::new(error)
            .with_suggestion("Values files must be YAML mappings. '$values/' prefixes are resolved from the current working directory"),

        HydrateError::ManifestParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Inspect the rendered chart output or directory files for invalid YAML"),

        HydrateError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the config file passed with --config and the HYDRATE_* environment variables"),

        HydrateError::ApplicationsFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Re-run with --verbose to see why each application failed"),

        HydrateError::FileSystemError { .. }
        | HydrateError::Other { .. } => ErrorContext::new(error),
    }
}
