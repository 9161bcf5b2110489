//! Pure deny-policy evaluation (no IO).
//!
//! Input: an attestation record plus an ordered list of policy modules.
//! Output: one `Decision` (allow, or deny with every reason found), or a typed fault.
//!
//! The rule language itself lives behind [`RuleEngine`]; this crate only knows that each
//! module declares a namespace and may expose a `deny` collection of strings.

#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod rules;

mod aggregate;
mod digest;
mod engine;
mod invoke;
mod normalize;
mod query;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use aggregate::aggregate;
pub use digest::module_digest;
pub use engine::{evaluate, evaluate_policies};
pub use error::{DecodeError, EngineError, Expected, PolicyDenied, PolicyError};
pub use invoke::invoke;
pub use model::{
    Decision, Document, Evaluation, EvaluatedModule, ExpressionResult, PolicyModule,
    RawResultSet, ResultSet,
};
pub use normalize::normalize;
pub use query::{CombinedQuery, build_query};
pub use rules::{ParsedModule, RuleEngine};
