//! Integration test suite for argocd-hydrate
//!
//! End-to-end tests that drive the compiled binary against temporary
//! applications files, plus library-level tests that run the full pipeline
//! with a recording chart engine instead of helm.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: the `argocd-hydrate` binary, flags, environment and exit codes
//! - **pipeline**: `hydrate_all` with chart sources and the mock engine

mod common;

mod cli;
mod pipeline;
