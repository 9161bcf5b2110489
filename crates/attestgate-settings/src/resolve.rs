use crate::model::AttestgateConfigV1;
use anyhow::Context;
use attestgate_types::SCHEMA_CONFIG_V1;
use globset::Glob;
use std::time::Duration;

/// Values supplied on the command line. They win over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    /// Extra policy files, appended after the configured explicit modules.
    pub policies: Vec<String>,
    pub timeout_ms: Option<u64>,
}

/// One explicitly listed policy file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSource {
    pub name: Option<String>,
    pub path: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Explicit modules in evaluation order.
    pub modules: Vec<ModuleSource>,
    /// Validated glob patterns, expanded by the caller against the filesystem.
    pub patterns: Vec<String>,
    pub timeout: Option<Duration>,
}

impl ResolvedConfig {
    pub fn has_policy_sources(&self) -> bool {
        !self.modules.is_empty() || !self.patterns.is_empty()
    }
}

pub fn resolve_config(
    cfg: AttestgateConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }

    let mut modules = Vec::with_capacity(cfg.modules.len() + overrides.policies.len());
    for (idx, m) in cfg.modules.into_iter().enumerate() {
        if m.path.trim().is_empty() {
            anyhow::bail!("modules[{idx}]: path must not be empty");
        }
        if let Some(name) = m.name.as_deref()
            && name.trim().is_empty()
        {
            anyhow::bail!("modules[{idx}]: name must not be empty when set");
        }
        modules.push(ModuleSource {
            name: m.name,
            path: m.path,
        });
    }
    for path in overrides.policies {
        if path.trim().is_empty() {
            anyhow::bail!("policy path must not be empty");
        }
        modules.push(ModuleSource { name: None, path });
    }

    validate_patterns(&cfg.policies)?;

    let timeout = match overrides.timeout_ms.or(cfg.timeout_ms) {
        Some(0) => anyhow::bail!("timeout_ms must be greater than zero"),
        Some(ms) => Some(Duration::from_millis(ms)),
        None => None,
    };

    Ok(ResolvedConfig {
        modules,
        patterns: cfg.policies,
        timeout,
    })
}

fn validate_patterns(patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid policy glob: {pattern}"))?;
    }
    Ok(())
}
