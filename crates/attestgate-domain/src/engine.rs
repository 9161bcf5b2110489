use crate::aggregate::aggregate;
use crate::error::{PolicyDenied, PolicyError};
use crate::invoke::invoke;
use crate::model::{Decision, EvaluatedModule, Evaluation, PolicyModule};
use crate::normalize::normalize;
use crate::query::build_query;
use crate::rules::{ParsedModule, RuleEngine};
use serde::Serialize;
use tracing::{debug, info};

/// Evaluate every module's `deny` rules against `record` and aggregate one decision.
///
/// Stages: normalize the record, parse modules and build the combined query, run the
/// engine once, decode and flatten the results.
pub fn evaluate<E, T>(
    engine: &E,
    record: &T,
    modules: &[PolicyModule],
) -> Result<Evaluation, PolicyError>
where
    E: RuleEngine,
    T: Serialize + ?Sized,
{
    let document = normalize(record)?;
    let (parsed, query) = build_query(engine, modules)?;
    debug!(query = %query, "built combined query");

    let raw = invoke(engine, &document, &parsed, &query)?;
    let decision = aggregate(&raw)?;

    match &decision {
        Decision::Allow => info!(modules = parsed.len(), "policy allowed attestation"),
        Decision::Deny { reasons } => info!(
            modules = parsed.len(),
            reasons = reasons.len(),
            "policy denied attestation"
        ),
    }

    let modules = parsed
        .iter()
        .map(|m| EvaluatedModule {
            name: m.name().to_string(),
            namespace: m.namespace().to_string(),
        })
        .collect();

    Ok(Evaluation {
        decision,
        query: query.into_paths(),
        modules,
    })
}

/// Gate form of [`evaluate`]: `Ok(())` on allow, [`PolicyError::Denied`] on deny.
pub fn evaluate_policies<E, T>(
    engine: &E,
    record: &T,
    modules: &[PolicyModule],
) -> Result<(), PolicyError>
where
    E: RuleEngine,
    T: Serialize + ?Sized,
{
    match evaluate(engine, record, modules)?.decision {
        Decision::Allow => Ok(()),
        Decision::Deny { reasons } => Err(PolicyDenied { reasons }.into()),
    }
}
