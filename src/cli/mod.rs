//! Command-line interface for argocd-hydrate.
//!
//! The tool has a single command: read the applications file, hydrate every
//! application and report the outcome. All settings can also be given through
//! `HYDRATE_*` environment variables or a TOML file passed with `--config`;
//! see [`crate::config`] for the precedence rules.
//!
//! # Examples
//!
//! ```bash
//! # Defaults: manifests/applications.yaml -> manifests/<app>/
//! argocd-hydrate
//!
//! # Render against an older cluster and stop at the first failure
//! argocd-hydrate --kube-version 1.29.4 --fail-fast
//!
//! # Machine-readable report
//! argocd-hydrate --quiet --json > report.json
//! ```

mod hydrate;

use crate::config::{ConfigFile, ConfigOverrides, HydrateConfig};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Print the report as JSON instead of a summary
    pub json: bool,
}

/// Hydrate ArgoCD applications into plain Kubernetes manifests.
#[derive(Parser, Debug)]
#[command(
    name = "argocd-hydrate",
    about = "Render ArgoCD applications into plain Kubernetes manifests",
    version,
    long_about = "Reads ArgoCD Application resources, renders their Helm chart and directory \
                  sources, and writes one manifest file per Kubernetes resource."
)]
pub struct Cli {
    /// File containing the ArgoCD Application resources
    #[arg(short, long, env = "HYDRATE_APPLICATIONS", value_name = "FILE")]
    applications: Option<String>,

    /// Directory that receives the hydrated manifests
    #[arg(short, long, env = "HYDRATE_OUTPUT", value_name = "DIR")]
    output: Option<String>,

    /// Local chart cache directory
    #[arg(long, env = "HYDRATE_CHARTS_DIR", value_name = "DIR")]
    charts_dir: Option<String>,

    /// Kubernetes version charts are rendered against (e.g. 1.31.1)
    #[arg(short, long, env = "HYDRATE_KUBE_VERSION", value_name = "VERSION")]
    kube_version: Option<String>,

    /// Helm executable to use
    #[arg(long, env = "HYDRATE_HELM", value_name = "PATH")]
    helm: Option<String>,

    /// TOML config file with default settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop at the first application that fails
    #[arg(long, overrides_with = "no_fail_fast")]
    fail_fast: bool,

    /// Keep going after a failed application, even if the config file sets fail_fast
    #[arg(long, overrides_with = "fail_fast")]
    no_fail_fast: bool,

    /// Print the hydration report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Run the command with settings taken from the parsed flags.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// ```rust
    /// use argocd_hydrate::cli::Cli;
    /// use clap::Parser;
    ///
    /// let cli = Cli::parse_from(["argocd-hydrate", "--verbose"]);
    /// assert_eq!(cli.build_config().log_level, "debug");
    /// ```
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            json: self.json,
        }
    }

    /// Run with an explicit [`CliConfig`].
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        init_logging(&config.log_level);

        let hydrate_config = self.hydrate_config()?;
        hydrate::run(&hydrate_config, config.json)
    }

    /// Assemble the run configuration from flags, environment and config file.
    pub fn hydrate_config(&self) -> Result<HydrateConfig> {
        let file = match &self.config {
            Some(path) => Some(ConfigFile::load_from(path)?),
            None => None,
        };

        let overrides = ConfigOverrides {
            applications_file: self.applications.clone(),
            output_dir: self.output.clone(),
            charts_dir: self.charts_dir.clone(),
            kube_version: self.kube_version.clone(),
            helm_binary: self.helm.clone(),
            fail_fast: self.fail_fast_override(),
        };

        HydrateConfig::resolve(&overrides, file.as_ref())
    }

    fn fail_fast_override(&self) -> Option<bool> {
        if self.fail_fast {
            Some(true)
        } else if self.no_fail_fast {
            Some(false)
        } else {
            None
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Logs go to stderr so
/// that stdout only carries the report.
pub fn init_logging(default_level: &str) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(default_level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
