//! Chart values: loading values files and merging them.
//!
//! Values files are merged in the order they are listed, later files taking
//! precedence. Inline `helm.values` is merged last. Nested mappings merge key
//! by key; any other value (scalar, sequence, null) at a shared key replaces
//! the earlier one outright.

use crate::constants::VALUES_REF_PREFIX;
use crate::core::HydrateError;
use anyhow::Result;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Remove a leading `$values/` from a values file reference.
///
/// The `ref: values` source is not fetched; its files are expected relative
/// to the working directory.
///
/// ```rust
/// use argocd_hydrate::render::values::strip_values_prefix;
///
/// assert_eq!(strip_values_prefix("$values/env/prod.yaml"), "env/prod.yaml");
/// assert_eq!(strip_values_prefix("values.yaml"), "values.yaml");
/// ```
#[must_use]
pub fn strip_values_prefix(path: &str) -> &str {
    path.strip_prefix(VALUES_REF_PREFIX).unwrap_or(path)
}

/// Load one values file as a mapping. An empty file is an empty mapping.
///
/// # Errors
///
/// Returns [`HydrateError::ValuesFileError`] if the file cannot be read, is
/// not valid YAML, or its top level is not a mapping.
pub fn load_values_file(path: &Path) -> Result<Mapping> {
    let values_error = |reason: String| HydrateError::ValuesFileError {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| values_error(e.to_string()))?;
    parse_values(&content).map_err(|reason| values_error(reason).into())
}

/// Parse a YAML document into a values mapping.
fn parse_values(content: &str) -> std::result::Result<Mapping, String> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(format!("expected a mapping at the top level, found {}", type_name(&other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Recursively merge `overrides` into `base`.
///
/// ```rust
/// use argocd_hydrate::render::values::deep_merge;
/// use serde_yaml::Mapping;
///
/// let mut base: Mapping = serde_yaml::from_str("a: {x: 1, y: 2}").unwrap();
/// let overrides: Mapping = serde_yaml::from_str("a: {y: 9, z: 3}").unwrap();
/// deep_merge(&mut base, overrides);
///
/// let expected: Mapping = serde_yaml::from_str("a: {x: 1, y: 9, z: 3}").unwrap();
/// assert_eq!(base, expected);
/// ```
pub fn deep_merge(base: &mut Mapping, overrides: Mapping) {
    for (key, override_value) in overrides {
        match (base.get_mut(&key), override_value) {
            (Some(Value::Mapping(base_map)), Value::Mapping(override_map)) => {
                deep_merge(base_map, override_map);
            }
            (_, override_value) => {
                base.insert(key, override_value);
            }
        }
    }
}

/// Load `value_files` in order and merge them, then merge `inline` on top.
///
/// `$values/` prefixes are stripped from each entry before loading. An empty
/// `inline` string adds nothing.
pub fn merge_values(value_files: &[String], inline: &str) -> Result<Mapping> {
    let mut merged = Mapping::new();

    for value_file in value_files {
        let path = Path::new(strip_values_prefix(value_file));
        tracing::debug!(target: "render", "Loading values file {}", path.display());
        deep_merge(&mut merged, load_values_file(path)?);
    }

    if !inline.trim().is_empty() {
        let inline_values = parse_values(inline).map_err(|reason| HydrateError::ValuesFileError {
            path: "helm.values".to_string(),
            reason,
        })?;
        deep_merge(&mut merged, inline_values);
    }

    Ok(merged)
}
