//! Config parsing and override resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::{AttestgateConfigV1, ModuleConfig};
pub use resolve::{ModuleSource, Overrides, ResolvedConfig};

/// Parse `attestgate.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<AttestgateConfigV1> {
    let cfg: AttestgateConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective settings for one run (file values + CLI overrides).
pub fn resolve_config(
    cfg: AttestgateConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
