//! argocd-hydrate CLI entry point
//!
//! Parses the command line, runs the hydration and turns any error into a
//! user-friendly message with a suggestion before exiting non-zero.

use argocd_hydrate::cli;
use argocd_hydrate::core::user_friendly_error;
use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
