use crate::error::PolicyError;
use crate::model::{Document, RawResultSet};
use crate::query::CombinedQuery;
use crate::rules::RuleEngine;
use tracing::debug;

/// Run the combined query once against `document` with every parsed module loaded.
///
/// An empty query is rejected before the engine is touched.
pub fn invoke<E: RuleEngine>(
    engine: &E,
    document: &Document,
    modules: &[E::Module],
    query: &CombinedQuery,
) -> Result<RawResultSet, PolicyError> {
    if query.is_empty() {
        return Err(PolicyError::EmptyQuery);
    }

    let raw = engine
        .eval(document, modules, query)
        .map_err(|source| PolicyError::Evaluation { source })?;

    debug!(
        modules = modules.len(),
        expressions = query.len(),
        result_sets = raw.results.len(),
        "evaluated combined query"
    );
    Ok(raw)
}
