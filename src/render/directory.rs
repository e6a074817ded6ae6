//! Collecting plain manifest files from a directory source.

use crate::application::DirectoryTarget;
use crate::constants::{DOCUMENT_SEPARATOR, YAML_EXTENSION};
use crate::core::HydrateError;
use crate::utils::read_text_file;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Concatenate the `.yaml` files under a directory source into one
/// multi-document text.
///
/// Only the root directory is read unless `recurse` is set. Files are
/// visited in lexicographic path order. Each file's content is trimmed and
/// gets a leading `---` line unless it already starts with one; files are
/// joined with a newline. An empty directory yields an empty string.
///
/// # Errors
///
/// - [`HydrateError::InvalidDirectory`] if the path is missing or not a directory
/// - an I/O error if a file cannot be read
pub fn collect_directory(target: DirectoryTarget<'_>) -> Result<String> {
    let root = Path::new(target.path);
    if !root.is_dir() {
        return Err(HydrateError::InvalidDirectory {
            path: target.path.to_string(),
        }
        .into());
    }

    let files = yaml_files(root, target.recurse)?;

    let mut documents = Vec::with_capacity(files.len());
    for file in &files {
        let content = read_text_file(file)?;
        let content = content.trim();
        if content.starts_with(DOCUMENT_SEPARATOR) {
            documents.push(content.to_string());
        } else {
            documents.push(format!("{DOCUMENT_SEPARATOR}\n{content}"));
        }
    }

    tracing::info!(
        target: "render",
        "Processed {} files from directory {} (recurse: {})",
        files.len(),
        root.display(),
        target.recurse
    );

    Ok(documents.join("\n"))
}

/// Sorted `.yaml` files below `root`.
fn yaml_files(root: &Path, recurse: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root);
    if !recurse {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to walk directory {}", root.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(YAML_EXTENSION) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}
