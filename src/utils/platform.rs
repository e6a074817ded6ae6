//! Platform-specific helpers
//!
//! Locating the `helm` executable and expanding user-supplied paths are the
//! only places where the hydration pipeline cares about the host platform.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Returns true when compiled for Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the platform-appropriate name of the helm executable.
///
/// # Examples
///
/// ```rust
/// use argocd_hydrate::utils::platform::get_helm_command;
///
/// let helm = get_helm_command();
/// assert!(helm.starts_with("helm"));
/// ```
#[must_use]
pub const fn get_helm_command() -> &'static str {
    if is_windows() { "helm.exe" } else { "helm" }
}

/// Checks whether a command is available, either as a path or on `PATH`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Resolves a path string with tilde and environment variable expansion.
///
/// `~/x`, `$VAR/x` and `${VAR}/x` are expanded; anything else is returned as
/// given. Relative paths stay relative to the process working directory.
///
/// # Examples
///
/// ```rust,no_run
/// use argocd_hydrate::utils::platform::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let cache = resolve_path("~/.cache/argocd-hydrate")?;
/// let output = resolve_path("$PWD/manifests")?;
/// # Ok(())
/// # }
/// ```
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(path).with_context(|| format!("Failed to expand path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
