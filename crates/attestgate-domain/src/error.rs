//! Fault taxonomy for one evaluation.
//!
//! Every variant except [`PolicyError::Denied`] is a fault: bad input, bad policy, or a
//! broken engine contract. None of them is transient, so nothing here is retried.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Error surfaced by a [`crate::RuleEngine`] implementation.
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shape the aggregator expected at a query path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    Sequence,
    String,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Sequence => f.write_str("sequence"),
            Expected::String => f.write_str("string"),
        }
    }
}

/// A result value that did not have the shape a `deny` rule must produce.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("invalid data from policy engine at {path}, expected {expected} but got {} {actual}", kind_of(.actual))]
pub struct DecodeError {
    /// Query text of the offending expression.
    pub path: String,
    pub expected: Expected,
    /// The value actually observed.
    ///
    /// With [`Expected::Sequence`] this is the whole value. With [`Expected::String`] it is
    /// only the first non-string element, not the sequence that contained it, so callers
    /// that want the full result must read it from the raw result set.
    pub actual: Value,
}

/// The expected negative outcome: at least one `deny` rule produced a reason.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("policy was denied due to:\n{}", .reasons.join("\n  -"))]
pub struct PolicyDenied {
    pub reasons: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to serialize attestation")]
    Serialization(#[source] serde_json::Error),

    #[error("failed to decode serialized attestation")]
    InputDecode(#[source] serde_json::Error),

    #[error("failed to parse policy module {module}")]
    ModuleParse {
        module: String,
        #[source]
        source: EngineError,
    },

    #[error("no policy modules to evaluate: the combined query is empty")]
    EmptyQuery,

    #[error("policy evaluation failed")]
    Evaluation {
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    InvalidData(#[from] DecodeError),

    #[error(transparent)]
    Denied(#[from] PolicyDenied),
}

impl PolicyError {
    /// True for the normal "policy said no" outcome, false for every fault.
    pub fn is_denied(&self) -> bool {
        matches!(self, PolicyError::Denied(_))
    }

    pub fn as_denied(&self) -> Option<&PolicyDenied> {
        match self {
            PolicyError::Denied(denied) => Some(denied),
            _ => None,
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn denied_message_joins_reasons_with_dash_prefix() {
        let err = PolicyDenied {
            reasons: vec![
                "missing signature".to_string(),
                "untrusted builder".to_string(),
                "stale".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "policy was denied due to:\nmissing signature\n  -untrusted builder\n  -stale"
        );
    }

    #[test]
    fn decode_error_names_path_shape_and_value() {
        let err = DecodeError {
            path: "data.a.deny".to_string(),
            expected: Expected::Sequence,
            actual: json!("nope"),
        };
        assert_eq!(
            err.to_string(),
            "invalid data from policy engine at data.a.deny, expected sequence but got string \"nope\""
        );
    }

    #[test]
    fn denied_is_distinguishable_from_faults() {
        let denied = PolicyError::from(PolicyDenied {
            reasons: vec!["x".to_string()],
        });
        assert!(denied.is_denied());
        assert_eq!(denied.as_denied().map(|d| d.reasons.len()), Some(1));

        let fault = PolicyError::EmptyQuery;
        assert!(!fault.is_denied());
        assert!(fault.as_denied().is_none());
    }

    #[test]
    fn denied_renders_transparently() {
        let err = PolicyError::from(PolicyDenied {
            reasons: vec!["only".to_string()],
        });
        assert_eq!(err.to_string(), "policy was denied due to:\nonly");
    }
}
