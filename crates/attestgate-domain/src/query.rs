use crate::error::PolicyError;
use crate::model::PolicyModule;
use crate::rules::{ParsedModule, RuleEngine};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Ordered, deduplicated list of `<namespace>.deny` expressions.
///
/// Rendered as text it is one expression per line, in first-occurrence order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombinedQuery {
    paths: Vec<String>,
}

impl CombinedQuery {
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn text(&self) -> String {
        self.paths.join("\n")
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl fmt::Display for CombinedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Parse every module in submission order and build the combined query.
///
/// Fails on the first module the engine rejects. Modules that share a namespace are all
/// returned (the engine merges their rule sets) but the namespace is queried once.
pub fn build_query<E: RuleEngine>(
    engine: &E,
    modules: &[PolicyModule],
) -> Result<(Vec<E::Module>, CombinedQuery), PolicyError> {
    let mut parsed = Vec::with_capacity(modules.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(modules.len());
    let mut paths = Vec::new();

    for module in modules {
        let parsed_module =
            engine
                .parse(&module.name, &module.source)
                .map_err(|source| PolicyError::ModuleParse {
                    module: module.name.clone(),
                    source,
                })?;

        let deny_path = format!("{}.{}", parsed_module.namespace(), DENY_RULE);
        if seen.insert(deny_path.clone()) {
            debug!(module = %module.name, path = %deny_path, "added deny path to query");
            paths.push(deny_path);
        } else {
            debug!(module = %module.name, path = %deny_path, "namespace already queried");
        }

        parsed.push(parsed_module);
    }

    Ok((parsed, CombinedQuery { paths }))
}

const DENY_RULE: &str = "deny";
