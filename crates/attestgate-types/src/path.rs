use camino::Utf8Path;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical root-relative path used for policy files in reports and module names.
///
/// Normalization rules are intentionally simple and deterministic:
/// - always forward slashes (`/`)
/// - no leading `./`
/// - absolute inputs are preserved as given
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct RepoPath(String);

impl Default for RepoPath {
    fn default() -> Self {
        RepoPath::new(".")
    }
}

impl RepoPath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while v.starts_with("./") {
            v = v.trim_start_matches("./").to_string();
        }
        // Avoid empty path; keep it explicit.
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    /// Path of `path` relative to `root`, or `path` itself when it lies outside `root`.
    pub fn relative_to(path: &Utf8Path, root: &Utf8Path) -> Self {
        match path.strip_prefix(root) {
            Ok(rel) => RepoPath::new(rel.as_str()),
            Err(_) => RepoPath::new(path.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
