//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Combined query construction and namespace deduplication
//! - Reason ordering and allow/deny selection in the aggregator
//! - Shape validation of raw engine output
//! - Exact integer preservation in the normalizer

use crate::aggregate::aggregate;
use crate::error::{Expected, PolicyError};
use crate::model::{Decision, RawResultSet};
use crate::normalize::normalize;
use crate::query::build_query;
use crate::test_support::{ScriptedEngine, expression, module};
use proptest::prelude::*;
use serde_json::{Value, json};
use std::collections::HashSet;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

/// Strategy for Rego-style package segments.
fn arb_namespace() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}(\\.[a-z][a-z0-9_]{0,11}){0,2}").unwrap()
}

/// Namespaces drawn from a small pool so duplicates are common.
fn arb_namespace_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "slsa", "sbom.v1"]), 0..16)
        .prop_map(|v| v.into_iter().map(str::to_string).collect())
}

/// Strategy for human-readable reasons.
fn arb_reason() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,40}").unwrap()
}

/// Strategy for JSON values that are not sequences.
fn arb_non_sequence() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        arb_reason().prop_map(Value::String),
        arb_reason().prop_map(|r| json!({ "msg": r })),
    ]
}

/// Strategy for JSON scalars that are not strings.
fn arb_non_string() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<u32>().prop_map(|n| json!(n)),
        Just(json!([])),
        Just(json!({})),
    ]
}

fn first_occurrence(namespaces: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    namespaces
        .iter()
        .filter(|ns| seen.insert(ns.as_str()))
        .map(|ns| format!("data.{ns}.deny"))
        .collect()
}

// ============================================================================
// Property tests: Combined query construction
// ============================================================================

proptest! {
    /// Distinct namespaces appear exactly once each, in submission order.
    #[test]
    fn distinct_namespaces_are_queried_in_order(
        namespaces in prop::collection::hash_set(arb_namespace(), 0..12)
    ) {
        let namespaces: Vec<String> = namespaces.into_iter().collect();
        let modules: Vec<_> = namespaces
            .iter()
            .enumerate()
            .map(|(i, ns)| module(&format!("m{i}.rego"), ns))
            .collect();

        let engine = ScriptedEngine::default();
        let (parsed, query) = build_query(&engine, &modules).unwrap();

        prop_assert_eq!(parsed.len(), modules.len());
        let expected: Vec<String> = namespaces.iter().map(|ns| format!("data.{ns}.deny")).collect();
        prop_assert_eq!(query.paths(), expected.as_slice());
    }

    /// Repeated namespaces collapse to their first occurrence; no module is dropped.
    #[test]
    fn duplicate_namespaces_collapse_to_first_occurrence(namespaces in arb_namespace_list()) {
        let modules: Vec<_> = namespaces
            .iter()
            .enumerate()
            .map(|(i, ns)| module(&format!("m{i}.rego"), ns))
            .collect();

        let engine = ScriptedEngine::default();
        let (parsed, query) = build_query(&engine, &modules).unwrap();

        prop_assert_eq!(parsed.len(), namespaces.len());
        let expected = first_occurrence(&namespaces);
        prop_assert_eq!(query.paths(), expected.as_slice());

        let unique: HashSet<&String> = query.paths().iter().collect();
        prop_assert_eq!(unique.len(), query.len());
    }

    /// The rendered query is exactly the paths joined by newlines.
    #[test]
    fn query_text_is_newline_joined(namespaces in arb_namespace_list()) {
        let modules: Vec<_> = namespaces.iter().map(|ns| module("m.rego", ns)).collect();
        let engine = ScriptedEngine::default();
        let (_, query) = build_query(&engine, &modules).unwrap();

        let text = query.text();
        let lines: Vec<&str> = if text.is_empty() { Vec::new() } else { text.split('\n').collect() };
        prop_assert_eq!(lines.len(), query.len());
        prop_assert!(!text.ends_with('\n'));
    }
}

// ============================================================================
// Property tests: Aggregation
// ============================================================================

proptest! {
    /// Deny iff at least one reason exists; reasons are the in-order flattening.
    #[test]
    fn aggregate_flattens_in_discovery_order(
        lists in prop::collection::vec(prop::collection::vec(arb_reason(), 0..4), 0..8)
    ) {
        let raw = RawResultSet {
            results: lists
                .iter()
                .enumerate()
                .map(|(i, reasons)| expression(&format!("data.m{i}.deny"), json!(reasons)))
                .collect(),
        };

        let flat: Vec<String> = lists.iter().flatten().cloned().collect();
        let decision = aggregate(&raw).unwrap();
        if flat.is_empty() {
            prop_assert_eq!(decision, Decision::Allow);
        } else {
            prop_assert_eq!(decision, Decision::Deny { reasons: flat });
        }
    }

    /// A non-sequence value anywhere aborts with a decode error naming its path.
    #[test]
    fn non_sequence_values_are_rejected(
        bad in arb_non_sequence(),
        before in prop::collection::vec(arb_reason(), 0..4),
    ) {
        let raw = RawResultSet {
            results: vec![
                expression("data.ok.deny", json!(before)),
                expression("data.bad.deny", bad.clone()),
            ],
        };

        match aggregate(&raw) {
            Err(PolicyError::InvalidData(e)) => {
                prop_assert_eq!(e.path, "data.bad.deny");
                prop_assert_eq!(e.expected, Expected::Sequence);
                prop_assert_eq!(e.actual, bad);
            }
            other => prop_assert!(false, "expected decode error, got {:?}", other),
        }
    }

    /// A non-string element anywhere aborts with a decode error carrying the element.
    #[test]
    fn non_string_elements_are_rejected(bad in arb_non_string(), reason in arb_reason()) {
        let raw = RawResultSet {
            results: vec![expression("data.mixed.deny", json!([reason, bad.clone()]))],
        };

        match aggregate(&raw) {
            Err(PolicyError::InvalidData(e)) => {
                prop_assert_eq!(e.expected, Expected::String);
                prop_assert_eq!(e.actual, bad);
            }
            other => prop_assert!(false, "expected decode error, got {:?}", other),
        }
    }
}

// ============================================================================
// Property tests: Normalization
// ============================================================================

proptest! {
    /// Every u64 and i64 survives normalization exactly.
    #[test]
    fn integers_round_trip_exactly(unsigned in any::<u64>(), signed in any::<i64>()) {
        let doc = normalize(&json!({ "u": unsigned, "s": signed })).unwrap();
        prop_assert_eq!(doc.as_value()["u"].as_u64(), Some(unsigned));
        prop_assert_eq!(doc.as_value()["s"].as_i64(), Some(signed));
    }

    /// Integer literals wider than 64 bits keep every digit through the document text.
    #[test]
    fn wide_integer_literals_keep_their_digits(digits in "[1-9][0-9]{19,40}") {
        let raw: Value = serde_json::from_str(&format!("{{\"n\":{digits}}}")).unwrap();
        let doc = normalize(&raw).unwrap();
        prop_assert_eq!(doc.to_json_string(), format!("{{\"n\":{digits}}}"));
    }
}
