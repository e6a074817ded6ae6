//! Splitting rendered text into individual Kubernetes manifests.
//!
//! Rendered chart output and collected directory content are multi-document
//! YAML. [`split_manifests`] turns that text into [`ManifestRecord`]s, one per
//! document that carries a `kind` and a usable name. Documents without either
//! are dropped silently: charts routinely emit empty or comment-only documents.
//!
//! Within one application, several records may share a kind and name (two
//! sources rendering the same resource, for example). [`ManifestNamer`] assigns
//! each record a unique output name so every written path is distinct.
//!
//! # Example
//!
//! ```rust
//! use argocd_hydrate::manifest::{ManifestNamer, split_manifests};
//!
//! let text = "---\nkind: ConfigMap\nmetadata:\n  name: app-x\n---\nkind: ConfigMap\nmetadata:\n  name: app-x\n";
//! let records = split_manifests(text).unwrap();
//!
//! let mut namer = ManifestNamer::new();
//! let names: Vec<_> = records.iter().map(|r| namer.unique_name(r)).collect();
//! assert_eq!(names, vec!["app-x", "app-x-1"]);
//! ```

use crate::constants::{DOCUMENT_SEPARATOR, GENERATED_NAME_SUFFIX};
use crate::core::HydrateError;
use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Matches lines consisting solely of the document separator.
static SEPARATOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^---[ \t]*\r?$").expect("separator pattern is valid"));

/// One rendered Kubernetes resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRecord {
    /// Resource kind, e.g. `Deployment`
    pub kind: String,
    /// `metadata.name`, or `metadata.generateName` + `generated`
    pub name: String,
    /// Document text, starting with `---\n` and ending with a newline
    pub content: String,
}

impl ManifestRecord {
    /// Build a record from a trimmed document body.
    fn from_document(kind: String, name: String, document: &str) -> Self {
        let mut content = format!("{DOCUMENT_SEPARATOR}\n{document}");
        if !content.ends_with('\n') {
            content.push('\n');
        }
        Self {
            kind,
            name,
            content,
        }
    }
}

/// Split multi-document YAML into manifest records.
///
/// Records keep the order in which their documents appear in `text`.
///
/// # Errors
///
/// Returns [`HydrateError::ManifestParseError`] if any document is not valid
/// YAML. A single malformed document fails the whole split.
pub fn split_manifests(text: &str) -> Result<Vec<ManifestRecord>> {
    let mut records = Vec::new();

    for chunk in SEPARATOR_LINE.split(text) {
        let document = chunk.trim();
        if document.is_empty() {
            continue;
        }

        let value: Value =
            serde_yaml::from_str(document).map_err(|e| HydrateError::ManifestParseError {
                reason: e.to_string(),
            })?;

        let Some(kind) = string_field(&value, &["kind"]) else {
            tracing::trace!(target: "manifest", "Skipping document without kind");
            continue;
        };

        let name = match string_field(&value, &["metadata", "name"]) {
            Some(name) => name.to_string(),
            None => match string_field(&value, &["metadata", "generateName"]) {
                Some(prefix) => format!("{prefix}{GENERATED_NAME_SUFFIX}"),
                None => {
                    tracing::trace!(target: "manifest", "Skipping {kind} without a name");
                    continue;
                }
            },
        };

        records.push(ManifestRecord::from_document(kind.to_string(), name, document));
    }

    Ok(records)
}

/// Look up a non-empty string at a nested key path.
fn string_field<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str().filter(|s| !s.is_empty())
}

/// Make a string safe to use as a file name.
///
/// Replaces `:` `/` `\` `.` and spaces with `-`.
///
/// ```rust
/// use argocd_hydrate::manifest::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("my.app:v1 beta"), "my-app-v1-beta");
/// ```
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ':' | '/' | '\\' | '.' | ' ' => '-',
            other => other,
        })
        .collect()
}

/// Assigns unique output names to the records of one application.
///
/// The key is (kind, sanitized name). The first record with a key keeps the
/// sanitized name; later ones get `-1`, `-2`, ... appended. A suffix that is
/// already taken, for example by a resource really named `app-x-1`, is
/// skipped, so no two records ever share an output file. Create one namer per
/// application.
#[derive(Debug, Default)]
pub struct ManifestNamer {
    seen: HashMap<(String, String), usize>,
    emitted: HashSet<(String, String)>,
}

impl ManifestNamer {
    /// Create an empty namer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the unique output name for `record`, registering its key.
    pub fn unique_name(&mut self, record: &ManifestRecord) -> String {
        let sanitized = sanitize_file_name(&record.name);
        // Output files are named after the lowercased kind.
        let file_kind = sanitize_file_name(&record.kind.to_lowercase());
        let count = self.seen.entry((record.kind.clone(), sanitized.clone())).or_insert(0);

        loop {
            let candidate = if *count == 0 {
                sanitized.clone()
            } else {
                format!("{sanitized}-{count}")
            };
            *count += 1;

            if self.emitted.insert((file_kind.clone(), candidate.clone())) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, name: &str) -> ManifestRecord {
        ManifestRecord::from_document(kind.to_string(), name.to_string(), "kind: X")
    }

    #[test]
    fn test_split_keeps_only_documents_with_kind_and_name() {
        let text = r#"---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
---
# Source: chart/templates/empty.yaml
---
apiVersion: v1
metadata:
  name: no-kind
---
apiVersion: v1
kind: Service
metadata:
  labels:
    app: web
---
apiVersion: v1
kind: Service
metadata:
  name: web
"#;
        let records = split_manifests(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!((records[0].kind.as_str(), records[0].name.as_str()), ("Deployment", "web"));
        assert_eq!((records[1].kind.as_str(), records[1].name.as_str()), ("Service", "web"));
    }

    #[test]
    fn test_split_restores_separator_and_newline() {
        let records = split_manifests("kind: ConfigMap\nmetadata:\n  name: cfg").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "---\nkind: ConfigMap\nmetadata:\n  name: cfg\n");
    }

    #[test]
    fn test_split_generate_name_fallback() {
        let text = "kind: Job\nmetadata:\n  generateName: migrate-\n";
        let records = split_manifests(text).unwrap();

        assert_eq!(records[0].name, "migrate-generated");
    }

    #[test]
    fn test_split_empty_kind_is_skipped() {
        let text = "kind: \"\"\nmetadata:\n  name: x\n";
        assert!(split_manifests(text).unwrap().is_empty());
    }

    #[test]
    fn test_split_malformed_document_fails_whole_split() {
        let text = "kind: ConfigMap\nmetadata:\n  name: ok\n---\nkind: [broken\n";
        let err = split_manifests(text).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<HydrateError>(),
            Some(HydrateError::ManifestParseError { .. })
        ));
    }

    #[test]
    fn test_split_only_on_whole_separator_lines() {
        // "---" inside a block scalar line is not a separator
        let text = "kind: ConfigMap\nmetadata:\n  name: banner\ndata:\n  text: |\n    ---- header ----\n";
        let records = split_manifests(text).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].content.contains("---- header ----"));
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split_manifests("").unwrap().is_empty());
        assert!(split_manifests("---\n---\n").unwrap().is_empty());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("my.app:v1 beta"), "my-app-v1-beta");
        assert_eq!(sanitize_file_name("a/b\\c"), "a-b-c");
        assert_eq!(sanitize_file_name("plain-name"), "plain-name");
    }

    #[test]
    fn test_namer_counts_collisions_per_key() {
        let mut namer = ManifestNamer::new();

        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x")), "app-x");
        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x")), "app-x-1");
        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x")), "app-x-2");
    }

    #[test]
    fn test_namer_different_kinds_do_not_collide() {
        let mut namer = ManifestNamer::new();

        assert_eq!(namer.unique_name(&record("Deployment", "web")), "web");
        assert_eq!(namer.unique_name(&record("Service", "web")), "web");
    }

    #[test]
    fn test_namer_keys_on_sanitized_name() {
        let mut namer = ManifestNamer::new();

        assert_eq!(namer.unique_name(&record("Secret", "tls.crt")), "tls-crt");
        assert_eq!(namer.unique_name(&record("Secret", "tls:crt")), "tls-crt-1");
    }

    #[test]
    fn test_namer_skips_suffix_taken_by_real_name() {
        let mut namer = ManifestNamer::new();

        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x")), "app-x");
        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x")), "app-x-1");
        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x-1")), "app-x-1-1");
        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x")), "app-x-2");
    }

    #[test]
    fn test_namer_real_name_first_then_suffix_skips_it() {
        let mut namer = ManifestNamer::new();

        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x-1")), "app-x-1");
        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x")), "app-x");
        assert_eq!(namer.unique_name(&record("ConfigMap", "app-x")), "app-x-2");
    }

    #[test]
    fn test_namer_kinds_differing_only_in_case_share_files() {
        let mut namer = ManifestNamer::new();

        assert_eq!(namer.unique_name(&record("ConfigMap", "cfg")), "cfg");
        assert_eq!(namer.unique_name(&record("configmap", "cfg")), "cfg-1");
    }
}
