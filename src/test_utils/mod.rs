//! Test utilities for argocd-hydrate
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests.
//!
//! - [`init_test_logging`] - one-time tracing setup for tests
//! - [`MockChartEngine`] - a [`ChartEngine`](crate::helm::ChartEngine) that
//!   records calls instead of running helm
//! - [`ApplicationFixture`] - sample applications files
//! - [`write_files`] - lay out a small file tree in a temp directory
//!
//! # Example
//!
//! ```rust,no_run
//! use argocd_hydrate::test_utils::{MockChartEngine, init_test_logging};
//!
//! init_test_logging(None);
//! let engine = MockChartEngine::new().with_render_output("kind: ConfigMap\nmetadata:\n  name: x\n");
//! assert!(engine.calls().is_empty());
//! ```

pub mod engine;
pub mod fixtures;

pub use engine::{EngineCall, MockChartEngine};
pub use fixtures::{ApplicationFixture, write_files};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, else `RUST_LOG`;
/// with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=helm=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
