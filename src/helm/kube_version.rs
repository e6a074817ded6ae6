//! Kubernetes version charts are rendered against.

use crate::constants::{FALLBACK_KUBE_MAJOR, FALLBACK_KUBE_MINOR};
use crate::core::HydrateError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static KUBE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(\.(\d+))?(-[a-zA-Z0-9]+)?$").expect("kube version pattern is valid")
});

/// A validated Kubernetes version with its major and minor components.
///
/// # Examples
///
/// ```rust
/// use argocd_hydrate::helm::KubeVersion;
///
/// let v = KubeVersion::parse("1.31.1").unwrap();
/// assert_eq!((v.major(), v.minor()), ("1", "31"));
///
/// assert!(KubeVersion::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeVersion {
    version: String,
    major: String,
    minor: String,
}

impl KubeVersion {
    /// Validate `version` against `MAJOR.MINOR[.PATCH][-suffix]`.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError::InvalidKubeVersion`] for anything else.
    pub fn parse(version: &str) -> Result<Self, HydrateError> {
        if !KUBE_VERSION.is_match(version) {
            return Err(HydrateError::InvalidKubeVersion {
                version: version.to_string(),
            });
        }

        let parts: Vec<&str> = version.split('.').collect();
        let (major, minor) = if parts.len() >= 2 {
            let minor = parts[1];
            let digits = minor.find(|c: char| !c.is_ascii_digit()).unwrap_or(minor.len());
            (parts[0].to_string(), minor[..digits].to_string())
        } else {
            (FALLBACK_KUBE_MAJOR.to_string(), FALLBACK_KUBE_MINOR.to_string())
        };

        Ok(Self {
            version: version.to_string(),
            major,
            minor,
        })
    }

    /// The full version string as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.version
    }

    /// Major component.
    #[must_use]
    pub fn major(&self) -> &str {
        &self.major
    }

    /// Minor component with any non-numeric suffix removed.
    #[must_use]
    pub fn minor(&self) -> &str {
        &self.minor
    }
}

impl fmt::Display for KubeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}
