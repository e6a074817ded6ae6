//! argocd-hydrate - render ArgoCD applications into plain Kubernetes manifests
//!
//! ArgoCD `Application` resources describe where an application's manifests
//! come from: a Helm chart with values files, or a directory of plain YAML.
//! This crate resolves those sources ahead of time and writes the result to
//! disk as one file per Kubernetes resource, so the hydrated state can be
//! reviewed, diffed and committed like any other file.
//!
//! # Architecture Overview
//!
//! ```text
//! applications.yaml
//!        │  application::load_applications
//!        ▼
//!   Application ──► hydrate::hydrate_all (one application at a time)
//!                        │
//!                        ├─ render::SourceRenderer (per source)
//!                        │     ├─ render::chart      → helm::ChartEngine (pull + template)
//!                        │     └─ render::directory  → walk *.yaml files
//!                        │
//!                        ├─ manifest::split_manifests
//!                        └─ manifest::ManifestNamer → <output>/<app>/<kind>-<name>.yaml
//! ```
//!
//! # Modules
//!
//! - [`application`] - `Application` model, source classification and loading
//! - [`cli`] - command-line interface
//! - [`config`] - run configuration (flags, environment, TOML file)
//! - [`constants`] - shared defaults and conventions
//! - [`core`] - error types and user-facing error reporting
//! - [`helm`] - chart engine abstraction, `helm` integration and chart cache
//! - [`hydrate`] - per-application driver and report
//! - [`manifest`] - splitting rendered text into resources, unique naming
//! - [`render`] - chart, values and directory rendering
//! - [`utils`] - file system and platform helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use argocd_hydrate::application::load_applications;
//! use argocd_hydrate::config::HydrateConfig;
//! use argocd_hydrate::helm::HelmCli;
//! use argocd_hydrate::hydrate::hydrate_all;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = HydrateConfig {
//!     kube_version: "1.30.4".to_string(),
//!     ..Default::default()
//! };
//! let applications = load_applications(&config.applications_file)?;
//! let report = hydrate_all(&applications, &config, &HelmCli::new(&config.helm_binary))?;
//! assert!(!report.has_failures());
//! # Ok(())
//! # }
//! ```

// Input model
pub mod application;
pub mod config;
pub mod constants;

// Pipeline
pub mod helm;
pub mod hydrate;
pub mod manifest;
pub mod render;

// Supporting modules
pub mod cli;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
