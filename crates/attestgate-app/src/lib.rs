//! Use case orchestration for attestgate.
//!
//! This crate provides the application layer: use cases that coordinate settings, policy
//! loading, the evaluation core, and report rendering. It is intentionally thin and
//! delegates the decision itself to `attestgate-domain`.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod deadline;
mod load;
mod render;
mod report;
mod verify;

pub use deadline::{VerifyError, evaluate_with_deadline};
pub use load::{LoadedModule, load_modules};
pub use render::render_markdown;
pub use report::{error_report, parse_report_json, serialize_report, verify_report};
pub use verify::{VerifyInput, VerifyOutput, run_query, run_verify};
