use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Canonical structured form of an attestation record, as handed to the rule engine.
///
/// Numbers are kept as exact literals, so a 19-digit build id reads back unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct Document(Value);

impl Document {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Compact JSON text of the document. Numbers are written back digit for digit.
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A named unit of rule-language source.
///
/// The source is shared so a module list can be handed to several concurrent
/// evaluations without copying policy text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyModule {
    pub name: String,
    pub source: Arc<str>,
}

impl PolicyModule {
    pub fn new(name: impl Into<String>, source: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            source: Arc::from(source.as_ref()),
        }
    }
}

/// One evaluated expression of the combined query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionResult {
    /// Query text the value belongs to, e.g. `data.a.deny`.
    pub text: String,
    pub value: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub expressions: Vec<ExpressionResult>,
}

/// Raw engine output, in the order the engine produced it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResultSet {
    pub results: Vec<ResultSet>,
}

/// Terminal outcome of one evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reasons: Vec<String> },
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Decision::Allow => &[],
            Decision::Deny { reasons } => reasons,
        }
    }
}

/// Module identity as seen by the engine, kept for reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluatedModule {
    pub name: String,
    pub namespace: String,
}

/// Everything one evaluation produced: the decision plus what it was computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    pub query: Vec<String>,
    pub modules: Vec<EvaluatedModule>,
}
