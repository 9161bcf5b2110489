use crate::load::LoadedModule;
use anyhow::Context;
use attestgate_domain::{Decision, Evaluation};
use attestgate_types::{
    ModuleRecord, SCHEMA_REPORT_V1, ToolMeta, Verdict, VerifyReport, ids::TOOL_NAME,
};
use time::OffsetDateTime;

pub fn parse_report_json(text: &str) -> anyhow::Result<VerifyReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema}");
    }

    serde_json::from_value(value).context("parse attestgate v1 report")
}

/// Pretty JSON with a trailing newline.
pub fn serialize_report(report: &VerifyReport) -> anyhow::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(report).context("serialize report")?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Build the report for a completed evaluation.
///
/// Module records pair each loaded file with the namespace the engine found for it.
/// `evaluation.modules` follows submission order, so the pairing is positional;
/// module names need not be unique.
pub fn verify_report(
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
    evaluation: &Evaluation,
    loaded: &[LoadedModule],
    attestation: Option<String>,
) -> VerifyReport {
    let mut evaluated = evaluation.modules.iter();
    let modules = loaded
        .iter()
        .map(|l| ModuleRecord {
            name: l.module.name.clone(),
            path: Some(l.path.clone()),
            namespace: evaluated.next().map(|m| m.namespace.clone()),
            sha256: l.sha256.clone(),
        })
        .collect();

    let (verdict, reasons) = match &evaluation.decision {
        Decision::Allow => (Verdict::Allow, Vec::new()),
        Decision::Deny { reasons } => (Verdict::Deny, reasons.clone()),
    };

    VerifyReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at,
        finished_at,
        verdict,
        reasons,
        query: evaluation.query.clone(),
        modules,
        attestation,
        error: None,
    }
}

/// Report for a run that could not produce a decision.
pub fn error_report(
    message: &str,
    loaded: &[LoadedModule],
    attestation: Option<String>,
) -> VerifyReport {
    let now = OffsetDateTime::now_utc();
    VerifyReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at: now,
        finished_at: now,
        verdict: Verdict::Error,
        reasons: Vec::new(),
        query: Vec::new(),
        modules: loaded
            .iter()
            .map(|l| ModuleRecord {
                name: l.module.name.clone(),
                path: Some(l.path.clone()),
                namespace: None,
                sha256: l.sha256.clone(),
            })
            .collect(),
        attestation,
        error: Some(message.to_string()),
    }
}
