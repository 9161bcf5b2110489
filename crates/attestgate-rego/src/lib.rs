//! [`RuleEngine`] implementation backed by `regorus`.
//!
//! `RegoEngine` holds no state. Parsing uses a throwaway `regorus::Engine`, and every
//! evaluation builds its own engine, loads the modules, binds the input, and drops it.

#![forbid(unsafe_code)]

use anyhow::Context;
use attestgate_domain::{
    CombinedQuery, Document, EngineError, ExpressionResult, ParsedModule, RawResultSet,
    ResultSet, RuleEngine,
};
use regorus::Value as RegoValue;
use std::sync::Arc;
use tracing::debug;

/// A module regorus accepted, with the package it declares.
#[derive(Clone, Debug)]
pub struct RegoModule {
    name: String,
    source: Arc<str>,
    package: String,
}

impl ParsedModule for RegoModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.package
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RegoEngine;

impl RegoEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEngine for RegoEngine {
    type Module = RegoModule;

    fn parse(&self, name: &str, source: &str) -> Result<Self::Module, EngineError> {
        let mut engine = regorus::Engine::new();
        let package = engine.add_policy(name.to_string(), source.to_string())?;
        debug!(module = name, package = %package, "parsed rego module");

        Ok(RegoModule {
            name: name.to_string(),
            source: Arc::from(source),
            package,
        })
    }

    fn eval(
        &self,
        document: &Document,
        modules: &[Self::Module],
        query: &CombinedQuery,
    ) -> Result<RawResultSet, EngineError> {
        let mut engine = regorus::Engine::new();
        for module in modules {
            engine
                .add_policy(module.name.clone(), module.source.to_string())
                .with_context(|| format!("failed to load module {}", module.name))?;
        }

        let input = RegoValue::from_json_str(&document.to_json_string())
            .context("failed to bind attestation as rego input")?;
        engine.set_input(input);

        // Each line is evaluated on its own: a rego query body is a conjunction, so one
        // package without a `deny` rule would otherwise hide every other package's reasons.
        let mut raw = RawResultSet::default();
        for path in query.paths() {
            let results = engine
                .eval_query(path.clone(), false)
                .with_context(|| format!("failed to evaluate {path}"))?;

            for result in results.result {
                let mut expressions = Vec::with_capacity(result.expressions.len());
                for expr in result.expressions {
                    if matches!(expr.value, RegoValue::Undefined) {
                        continue;
                    }
                    let value = serde_json::to_value(&expr.value)
                        .with_context(|| format!("failed to convert result of {path}"))?;
                    expressions.push(ExpressionResult {
                        text: expr.text.to_string(),
                        value,
                    });
                }
                if !expressions.is_empty() {
                    raw.results.push(ResultSet { expressions });
                }
            }
        }

        Ok(raw)
    }
}
