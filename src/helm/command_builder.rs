//! Builder for running the `helm` executable with consistent error handling
//!
//! Every interaction with helm goes through [`HelmCommand`], which logs the
//! invocation, captures output and converts failures into
//! [`HydrateError::HelmCommandError`] carrying the subcommand and stderr.
//!
//! # Examples
//!
//! ```rust,no_run
//! use argocd_hydrate::helm::command_builder::HelmCommand;
//!
//! # fn example() -> anyhow::Result<()> {
//! let version = HelmCommand::new("helm")
//!     .args(["version", "--short"])
//!     .execute_stdout()?;
//! println!("{version}");
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::core::HydrateError;
use crate::utils::command_exists;

/// Type-safe builder for constructing and executing helm commands.
///
/// Commands run synchronously and block until helm exits. There is no
/// timeout; a hung network fetch blocks the caller.
#[derive(Debug, Clone)]
pub struct HelmCommand {
    /// Executable to run, a name on `PATH` or a path
    binary: String,

    /// Command arguments (e.g. ["pull", "oci://...", "--untar"])
    args: Vec<String>,

    /// Optional context string for log lines
    context: Option<String>,
}

impl HelmCommand {
    /// Creates a new builder for `binary` with no arguments.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            context: None,
        }
    }

    /// Adds a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds a path argument.
    #[must_use]
    pub fn path_arg(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().display().to_string();
        self.arg(path)
    }

    /// Adds a context label used in log lines.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Arguments collected so far.
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// The helm subcommand, e.g. `pull` or `repo add`.
    fn operation(&self) -> String {
        match self.args.first().map(String::as_str) {
            Some("repo") => {
                format!("repo {}", self.args.get(1).map(String::as_str).unwrap_or_default())
            }
            Some(op) => op.to_string(),
            None => "unknown".to_string(),
        }
    }

    /// Run the command and capture its output.
    ///
    /// # Errors
    ///
    /// - [`HydrateError::HelmNotFound`] if the executable cannot be located
    /// - [`HydrateError::HelmCommandError`] if helm exits unsuccessfully
    pub fn execute(self) -> Result<HelmCommandOutput> {
        if !command_exists(&self.binary) {
            return Err(HydrateError::HelmNotFound.into());
        }

        let start = std::time::Instant::now();
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args);

        match &self.context {
            Some(ctx) => tracing::debug!(
                target: "helm",
                "({}) Executing command: {} {}",
                ctx,
                self.binary,
                self.args.join(" ")
            ),
            None => tracing::debug!(
                target: "helm",
                "Executing command: {} {}",
                self.binary,
                self.args.join(" ")
            ),
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute {} {}", self.binary, self.args.join(" ")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "helm",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "helm", "Error: {}", stderr.trim());
            }

            return Err(HydrateError::HelmCommandError {
                operation: self.operation(),
                stderr: if stderr.is_empty() { stdout } else { stderr },
            }
            .into());
        }

        if !stderr.is_empty() {
            tracing::debug!(target: "helm", "{}", stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::debug!(
                target: "helm::perf",
                "helm {} took {:.2}s",
                self.operation(),
                elapsed.as_secs_f64()
            );
        }

        Ok(HelmCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute the command and return stdout as a trimmed string.
    pub fn execute_stdout(self) -> Result<String> {
        let output = self.execute()?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute the command and discard its output.
    pub fn execute_success(self) -> Result<()> {
        self.execute()?;
        Ok(())
    }
}

/// Output from a helm command
#[derive(Debug, Clone)]
pub struct HelmCommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error output
    pub stderr: String,
}
