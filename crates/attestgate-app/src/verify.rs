//! The `verify` use case: load policies, evaluate an attestation, produce a report.

use crate::deadline::{VerifyError, evaluate_with_deadline};
use crate::load::{LoadedModule, load_modules};
use crate::report::{error_report, verify_report};
use anyhow::Context;
use attestgate_domain::{CombinedQuery, Decision, PolicyDenied, PolicyModule, build_query};
use attestgate_rego::RegoEngine;
use attestgate_settings::{AttestgateConfigV1, Overrides, ResolvedConfig};
use attestgate_types::VerifyReport;
use camino::Utf8Path;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Input for the verify use case.
#[derive(Clone, Debug)]
pub struct VerifyInput<'a> {
    /// Directory that config-relative policy paths resolve against.
    pub root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    pub overrides: Overrides,
    /// Attestation JSON text.
    pub attestation_text: &'a str,
    /// Recorded in the report, usually the attestation file path.
    pub attestation_label: Option<String>,
}

#[derive(Debug)]
pub struct VerifyOutput {
    pub report: VerifyReport,
    /// `Ok` on allow. A denial is `Err` with [`VerifyError::is_denied`] set.
    pub outcome: Result<(), VerifyError>,
    pub resolved_config: ResolvedConfig,
}

impl VerifyOutput {
    pub fn exit_code(&self) -> i32 {
        self.report.verdict.exit_code()
    }
}

fn resolve(config_text: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    // Empty is allowed, defaults apply.
    let cfg = if config_text.trim().is_empty() {
        AttestgateConfigV1::default()
    } else {
        attestgate_settings::parse_config_toml(config_text).context("parse config")?
    };
    attestgate_settings::resolve_config(cfg, overrides).context("resolve config")
}

/// Run the verify use case.
///
/// Setup failures (config, policy files, attestation JSON) are returned as `Err`.
/// Once evaluation starts, every fault is captured in a report with verdict `error`.
pub fn run_verify(input: VerifyInput<'_>) -> anyhow::Result<VerifyOutput> {
    let started_at = OffsetDateTime::now_utc();

    let resolved = resolve(input.config_text, input.overrides)?;
    let loaded = load_modules(input.root, &resolved)?;
    let record: serde_json::Value =
        serde_json::from_str(input.attestation_text).context("parse attestation json")?;

    let modules: Vec<PolicyModule> = loaded.iter().map(|l| l.module.clone()).collect();
    debug!(
        modules = modules.len(),
        timeout_ms = resolved.timeout.map(|t| t.as_millis() as u64),
        "starting verification"
    );

    let (report, outcome) =
        match evaluate_with_deadline(RegoEngine::new(), record, modules, resolved.timeout) {
            Ok(evaluation) => {
                let report = verify_report(
                    started_at,
                    OffsetDateTime::now_utc(),
                    &evaluation,
                    &loaded,
                    input.attestation_label,
                );
                let outcome = gate(&evaluation.decision);
                (report, outcome)
            }
            Err(err) => {
                info!(error = %err, "verification fault");
                let mut report =
                    error_report(&format_fault(&err), &loaded, input.attestation_label);
                report.started_at = started_at;
                (report, Err(err))
            }
        };

    Ok(VerifyOutput {
        report,
        outcome,
        resolved_config: resolved,
    })
}

fn gate(decision: &Decision) -> Result<(), VerifyError> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny { reasons } => Err(VerifyError::Policy(
            PolicyDenied {
                reasons: reasons.clone(),
            }
            .into(),
        )),
    }
}

/// Error message plus its source chain, `: `-separated.
fn format_fault(err: &VerifyError) -> String {
    let mut out = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Resolve config, load the modules, and return the combined query without evaluating.
pub fn run_query(
    root: &Utf8Path,
    config_text: &str,
    overrides: Overrides,
) -> anyhow::Result<CombinedQuery> {
    let resolved = resolve(config_text, overrides)?;
    let loaded: Vec<LoadedModule> = load_modules(root, &resolved)?;
    let modules: Vec<PolicyModule> = loaded.into_iter().map(|l| l.module).collect();

    let (_, query) = build_query(&RegoEngine::new(), &modules).context("build query")?;
    Ok(query)
}
