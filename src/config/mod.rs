//! Run configuration.
//!
//! A [`HydrateConfig`] is assembled once at start-up and passed by reference
//! to everything that needs it. Values come from, highest precedence first:
//!
//! 1. command-line flags
//! 2. `HYDRATE_*` environment variables (handled by clap alongside the flags)
//! 3. an optional TOML file given with `--config`
//! 4. built-in defaults
//!
//! Path values go through `~` and environment variable expansion.
//!
//! # Config file
//!
//! ```toml
//! applications_file = "deploy/applications.yaml"
//! output_dir = "deploy/hydrated"
//! charts_dir = "~/.cache/argocd-hydrate/charts"
//! kube_version = "1.30.4"
//! fail_fast = true
//! helm_binary = "/usr/local/bin/helm"
//! ```

use crate::constants::{
    DEFAULT_APPLICATIONS_FILE, DEFAULT_CHARTS_DIR, DEFAULT_KUBE_VERSION, DEFAULT_OUTPUT_DIR,
};
use crate::core::HydrateError;
use crate::utils::{get_helm_command, read_text_file, resolve_path};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings for one hydration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrateConfig {
    /// File holding the `Application` resources
    pub applications_file: PathBuf,
    /// Root directory for hydrated manifests
    pub output_dir: PathBuf,
    /// Local chart cache
    pub charts_dir: PathBuf,
    /// Kubernetes version charts are rendered against
    pub kube_version: String,
    /// Stop at the first failing application
    pub fail_fast: bool,
    /// Helm executable
    pub helm_binary: String,
}

impl Default for HydrateConfig {
    fn default() -> Self {
        Self {
            applications_file: PathBuf::from(DEFAULT_APPLICATIONS_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            charts_dir: PathBuf::from(DEFAULT_CHARTS_DIR),
            kube_version: DEFAULT_KUBE_VERSION.to_string(),
            fail_fast: false,
            helm_binary: get_helm_command().to_string(),
        }
    }
}

/// Contents of a `--config` TOML file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Applications file path
    pub applications_file: Option<String>,
    /// Output root
    pub output_dir: Option<String>,
    /// Chart cache directory
    pub charts_dir: Option<String>,
    /// Kubernetes version for rendering
    pub kube_version: Option<String>,
    /// Stop at the first failing application
    pub fail_fast: Option<bool>,
    /// Helm executable
    pub helm_binary: Option<String>,
}

impl ConfigFile {
    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError::ConfigError`] if the file cannot be read or is
    /// not valid TOML with the expected keys.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = read_text_file(path).map_err(|e| HydrateError::ConfigError {
            message: format!("{e:#}"),
        })?;

        toml::from_str(&content).map_err(|e| {
            HydrateError::ConfigError {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--applications` / `HYDRATE_APPLICATIONS`
    pub applications_file: Option<String>,
    /// `--output` / `HYDRATE_OUTPUT`
    pub output_dir: Option<String>,
    /// `--charts-dir` / `HYDRATE_CHARTS_DIR`
    pub charts_dir: Option<String>,
    /// `--kube-version` / `HYDRATE_KUBE_VERSION`
    pub kube_version: Option<String>,
    /// `--helm` / `HYDRATE_HELM`
    pub helm_binary: Option<String>,
    /// `Some(true)` for `--fail-fast`, `Some(false)` for `--no-fail-fast`,
    /// `None` to defer to the config file
    pub fail_fast: Option<bool>,
}

impl HydrateConfig {
    /// Layer `overrides` over `file` over the defaults.
    ///
    /// ```rust
    /// use argocd_hydrate::config::{ConfigFile, ConfigOverrides, HydrateConfig};
    ///
    /// let file = ConfigFile {
    ///     kube_version: Some("1.29.0".to_string()),
    ///     output_dir: Some("out".to_string()),
    ///     ..Default::default()
    /// };
    /// let overrides = ConfigOverrides {
    ///     kube_version: Some("1.30.0".to_string()),
    ///     ..Default::default()
    /// };
    ///
    /// let config = HydrateConfig::resolve(&overrides, Some(&file)).unwrap();
    /// assert_eq!(config.kube_version, "1.30.0");
    /// assert_eq!(config.output_dir, std::path::PathBuf::from("out"));
    /// ```
    pub fn resolve(overrides: &ConfigOverrides, file: Option<&ConfigFile>) -> Result<Self> {
        let defaults = Self::default();
        let file = file.cloned().unwrap_or_default();

        let pick = |flag: &Option<String>, from_file: Option<String>| -> Option<String> {
            flag.clone().or(from_file)
        };

        let path_setting = |value: Option<String>, default: PathBuf| -> Result<PathBuf> {
            match value {
                Some(value) => resolve_path(&value),
                None => Ok(default),
            }
        };

        let config = Self {
            applications_file: path_setting(
                pick(&overrides.applications_file, file.applications_file),
                defaults.applications_file,
            )
            .context("Invalid applications file path")?,
            output_dir: path_setting(pick(&overrides.output_dir, file.output_dir), defaults.output_dir)
                .context("Invalid output directory")?,
            charts_dir: path_setting(pick(&overrides.charts_dir, file.charts_dir), defaults.charts_dir)
                .context("Invalid charts directory")?,
            kube_version: pick(&overrides.kube_version, file.kube_version)
                .unwrap_or(defaults.kube_version),
            fail_fast: overrides.fail_fast.or(file.fail_fast).unwrap_or(defaults.fail_fast),
            helm_binary: pick(&overrides.helm_binary, file.helm_binary)
                .unwrap_or(defaults.helm_binary),
        };

        tracing::debug!(target: "hydrate", "Resolved configuration: {:?}", config);
        Ok(config)
    }
}
