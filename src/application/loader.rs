//! Loading `Application` resources from a multi-document YAML file.

use super::Application;
use crate::constants::ARGOCD_API_GROUP_PREFIX;
use crate::core::HydrateError;
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Load the ArgoCD applications defined in `path`.
///
/// Every YAML document in the file is inspected; documents that are not
/// ArgoCD `Application` resources are ignored, as are empty documents.
/// Applications without any source are skipped with a warning.
///
/// # Errors
///
/// - [`HydrateError::ApplicationsFileNotFound`] if the file cannot be read
/// - [`HydrateError::ApplicationsParseError`] if any document is not valid YAML
///   or does not fit the `Application` shape
///
/// # Examples
///
/// ```rust,no_run
/// use argocd_hydrate::application::load_applications;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let apps = load_applications(Path::new("manifests/applications.yaml"))?;
/// for app in &apps {
///     println!("{} -> {}", app.name(), app.effective_namespace());
/// }
/// # Ok(())
/// # }
/// ```
pub fn load_applications(path: &Path) -> Result<Vec<Application>> {
    let content = std::fs::read_to_string(path).map_err(|_| HydrateError::ApplicationsFileNotFound {
        path: path.display().to_string(),
    })?;

    parse_applications(&content, path)
}

/// Parse applications from already loaded file content.
///
/// `origin` is only used in error messages.
pub fn parse_applications(content: &str, origin: &Path) -> Result<Vec<Application>> {
    let parse_error = |e: serde_yaml::Error| HydrateError::ApplicationsParseError {
        path: origin.display().to_string(),
        reason: e.to_string(),
    };

    let mut applications = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document).map_err(parse_error)?;
        if value.is_null() {
            continue;
        }

        let kind = value.get("kind").and_then(serde_yaml::Value::as_str).unwrap_or_default();
        let api_version =
            value.get("apiVersion").and_then(serde_yaml::Value::as_str).unwrap_or_default();
        if kind != "Application" || !api_version.starts_with(ARGOCD_API_GROUP_PREFIX) {
            tracing::debug!(
                target: "hydrate",
                "Skipping non-Application document (kind: {kind:?}, apiVersion: {api_version:?})"
            );
            continue;
        }

        let application: Application = serde_yaml::from_value(value).map_err(parse_error)?;

        if application.sources().is_empty() {
            tracing::warn!(
                target: "hydrate",
                "Application {} has no sources, skipping",
                application.name()
            );
            continue;
        }

        applications.push(application);
    }

    Ok(applications)
}
