//! Fuzz target for decoding raw engine results into a decision.
//!
//! Goal: `aggregate` should **never panic**, whatever shape the engine returns.
//! Malformed values must surface as `InvalidData`, and a `Deny` must carry reasons.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_result_decoding
//! ```

#![no_main]

use arbitrary::Arbitrary;
use attestgate_domain::{Decision, ExpressionResult, PolicyError, RawResultSet, ResultSet};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct ResultInput {
    /// One JSON text per expression, grouped into result sets.
    sets: Vec<Vec<String>>,
}

fuzz_target!(|input: ResultInput| {
    if input.sets.len() > 16 {
        return;
    }

    let results = input
        .sets
        .into_iter()
        .map(|exprs| ResultSet {
            expressions: exprs
                .into_iter()
                .take(16)
                .filter_map(|text| serde_json::from_str(&text).ok())
                .map(|value| ExpressionResult {
                    text: "data.fuzz.deny".to_string(),
                    value,
                })
                .collect(),
        })
        .collect();

    match attestgate_domain::aggregate(&RawResultSet { results }) {
        Ok(Decision::Deny { reasons }) => assert!(!reasons.is_empty()),
        Ok(Decision::Allow) | Err(PolicyError::InvalidData(_)) => {}
        Err(other) => panic!("unexpected error kind: {other}"),
    }
});
