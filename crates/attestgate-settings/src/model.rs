use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `attestgate.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttestgateConfigV1 {
    /// Optional schema string for tooling (`attestgate.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Glob patterns selecting policy files, relative to the root directory.
    #[serde(default)]
    pub policies: Vec<String>,

    /// Explicit policy modules, evaluated before any glob matches.
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,

    /// Abandon evaluation after this many milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModuleConfig {
    /// Label used when parsing the module. Defaults to the root-relative path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Path to the `.rego` file, relative to the root directory.
    pub path: String,
}
