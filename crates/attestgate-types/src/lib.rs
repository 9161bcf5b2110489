//! Stable DTOs and IDs used across the attestgate workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted verification report
//! - stable schema identifiers and exit codes
//! - canonical root-relative path handling for policy files

#![forbid(unsafe_code)]

pub mod ids;
pub mod path;
pub mod report;

pub use path::RepoPath;
pub use report::{
    ModuleRecord, SCHEMA_CONFIG_V1, SCHEMA_REPORT_V1, ToolMeta, Verdict, VerifyReport,
};
