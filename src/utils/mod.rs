//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - File system operations with atomic writes
//! - [`platform`] - Platform-specific helpers, path expansion and executable lookup
//!
//! # Example
//!
//! ```rust,no_run
//! use argocd_hydrate::utils::{ensure_dir, safe_write};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("manifests/guestbook"))?;
//! safe_write(Path::new("manifests/guestbook/service-web.yaml"), "---\nkind: Service\n")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, ensure_dir, read_text_file, read_yaml_file, remove_dir_all, safe_write};
pub use platform::{command_exists, get_helm_command, is_windows, resolve_path};
