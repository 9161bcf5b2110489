//! A tiny line-oriented rule engine for exercising the core without a real Rego engine.
//!
//! Module source format, one directive per line:
//! - `package <ns>`: required first directive; the namespace becomes `data.<ns>`
//! - `deny <reason>`: contributes a reason to `<ns>.deny`
//! - `raw <json>`: makes `<ns>.deny` evaluate to this exact JSON value
//! - `fail <message>`: evaluation of any query touching this module fails

use crate::error::EngineError;
use crate::model::{Document, ExpressionResult, PolicyModule, RawResultSet, ResultSet};
use crate::query::CombinedQuery;
use crate::rules::{ParsedModule, RuleEngine};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug)]
pub struct ScriptedModule {
    name: String,
    namespace: String,
    reasons: Vec<String>,
    raw: Option<Value>,
    fail: Option<String>,
}

impl ParsedModule for ScriptedModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[derive(Debug, Default)]
pub struct ScriptedEngine {
    evals: AtomicUsize,
}

impl ScriptedEngine {
    pub fn eval_count(&self) -> usize {
        self.evals.load(Ordering::SeqCst)
    }
}

impl RuleEngine for ScriptedEngine {
    type Module = ScriptedModule;

    fn parse(&self, name: &str, source: &str) -> Result<Self::Module, EngineError> {
        let mut lines = source.lines().map(str::trim).filter(|l| !l.is_empty());
        let namespace = match lines.next().and_then(|l| l.strip_prefix("package ")) {
            Some(ns) => format!("data.{}", ns.trim()),
            None => return Err(format!("{name}: missing package declaration").into()),
        };

        let mut module = ScriptedModule {
            name: name.to_string(),
            namespace,
            reasons: Vec::new(),
            raw: None,
            fail: None,
        };
        for line in lines {
            if let Some(reason) = line.strip_prefix("deny ") {
                module.reasons.push(reason.to_string());
            } else if let Some(raw) = line.strip_prefix("raw ") {
                module.raw = Some(serde_json::from_str(raw)?);
            } else if let Some(msg) = line.strip_prefix("fail ") {
                module.fail = Some(msg.to_string());
            } else {
                return Err(format!("{name}: unknown directive {line:?}").into());
            }
        }
        Ok(module)
    }

    fn eval(
        &self,
        _document: &Document,
        modules: &[Self::Module],
        query: &CombinedQuery,
    ) -> Result<RawResultSet, EngineError> {
        self.evals.fetch_add(1, Ordering::SeqCst);

        let mut raw = RawResultSet::default();
        for path in query.paths() {
            let members: Vec<&ScriptedModule> = modules
                .iter()
                .filter(|m| format!("{}.deny", m.namespace) == *path)
                .collect();

            if let Some(msg) = members.iter().find_map(|m| m.fail.as_ref()) {
                return Err(msg.clone().into());
            }

            // Same-namespace modules merge in submission order; an empty set is still defined.
            let value = match members.iter().find_map(|m| m.raw.clone()) {
                Some(v) => v,
                None => Value::Array(
                    members
                        .iter()
                        .flat_map(|m| m.reasons.iter().cloned().map(Value::String))
                        .collect(),
                ),
            };

            raw.results.push(ResultSet {
                expressions: vec![ExpressionResult {
                    text: path.clone(),
                    value,
                }],
            });
        }
        Ok(raw)
    }
}

/// A module in namespace `data.<ns>` with no deny reasons.
pub fn module(name: &str, ns: &str) -> PolicyModule {
    PolicyModule::new(name, format!("package {ns}\n"))
}

/// A module in namespace `data.<ns>` denying with each of `reasons`.
pub fn denying_module(name: &str, ns: &str, reasons: &[&str]) -> PolicyModule {
    let mut source = format!("package {ns}\n");
    for r in reasons {
        source.push_str(&format!("deny {r}\n"));
    }
    PolicyModule::new(name, source)
}

pub fn expression(text: &str, value: Value) -> ResultSet {
    ResultSet {
        expressions: vec![ExpressionResult {
            text: text.to_string(),
            value,
        }],
    }
}
