use crate::error::{DecodeError, Expected, PolicyError};
use crate::model::{Decision, RawResultSet};
use serde_json::Value;

/// Flatten every denial reason in `raw` into one decision.
///
/// Order is result-set order, then expression order, then element order. Any value that
/// is not a sequence of strings aborts the whole aggregation; there is no partial result.
pub fn aggregate(raw: &RawResultSet) -> Result<Decision, PolicyError> {
    let mut reasons = Vec::new();

    for result_set in &raw.results {
        for expression in &result_set.expressions {
            for reason in expect_strings(&expression.text, &expression.value)? {
                reasons.push(reason.to_string());
            }
        }
    }

    if reasons.is_empty() {
        Ok(Decision::Allow)
    } else {
        Ok(Decision::Deny { reasons })
    }
}

/// Check that `value` at `path` is a sequence of strings and borrow them.
fn expect_strings<'v>(path: &str, value: &'v Value) -> Result<Vec<&'v str>, DecodeError> {
    let items = value.as_array().ok_or_else(|| DecodeError {
        path: path.to_string(),
        expected: Expected::Sequence,
        actual: value.clone(),
    })?;

    items
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| DecodeError {
                path: path.to_string(),
                expected: Expected::String,
                actual: item.clone(),
            })
        })
        .collect()
}
