use crate::RepoPath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifiers.
pub const SCHEMA_REPORT_V1: &str = "attestgate.report.v1";
pub const SCHEMA_CONFIG_V1: &str = "attestgate.config.v1";

/// Outcome of one verification run.
///
/// `Error` means the evaluation itself broke (bad policy, bad input, timeout); it is
/// never a policy decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Deny,
    Error,
}

impl Verdict {
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Allow => crate::ids::EXIT_ALLOW,
            Verdict::Deny => crate::ids::EXIT_DENY,
            Verdict::Error => crate::ids::EXIT_ERROR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// One policy module that took part in the evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModuleRecord {
    /// Label the module was parsed under.
    pub name: String,

    /// Source file, when the module was loaded from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<RepoPath>,

    /// Declared package, e.g. `data.slsa`. Missing when parsing never got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Hex sha256 of the module source bytes.
    pub sha256: String,
}

/// Report written by `attestgate verify`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VerifyReport {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub verdict: Verdict,

    /// Denial reasons in discovery order. Empty unless the verdict is `deny`.
    #[serde(default)]
    pub reasons: Vec<String>,

    /// The combined query, one `<namespace>.deny` path per entry.
    #[serde(default)]
    pub query: Vec<String>,

    #[serde(default)]
    pub modules: Vec<ModuleRecord>,

    /// Label of the attestation input (usually its file path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,

    /// Rendered fault, present only when the verdict is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn verdict_serializes_lowercase() {
        let v = serde_json::to_value(Verdict::Deny).expect("serialize verdict");
        assert_eq!(v, serde_json::json!("deny"));
    }

    #[test]
    fn exit_codes_follow_verdict() {
        assert_eq!(Verdict::Allow.exit_code(), 0);
        assert_eq!(Verdict::Deny.exit_code(), 2);
        assert_eq!(Verdict::Error.exit_code(), 1);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let report = VerifyReport {
            schema: SCHEMA_REPORT_V1.to_string(),
            tool: ToolMeta {
                name: "attestgate".to_string(),
                version: "0.1.0".to_string(),
            },
            started_at: datetime!(2025-01-01 00:00:00 UTC),
            finished_at: datetime!(2025-01-01 00:00:01 UTC),
            verdict: Verdict::Allow,
            reasons: Vec::new(),
            query: vec!["data.a.deny".to_string()],
            modules: vec![ModuleRecord {
                name: "a.rego".to_string(),
                path: None,
                namespace: Some("data.a".to_string()),
                sha256: "00".to_string(),
            }],
            attestation: None,
            error: None,
        };

        let v = serde_json::to_value(&report).expect("serialize report");
        let obj = v.as_object().expect("report is an object");
        assert!(!obj.contains_key("error"));
        assert!(!obj.contains_key("attestation"));
        assert!(!v["modules"][0].as_object().expect("module").contains_key("path"));
        assert_eq!(v["started_at"], "2025-01-01T00:00:00Z");
    }
}
