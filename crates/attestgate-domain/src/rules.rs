//! The seam to the embedded rule engine.
//!
//! The core never interprets the rule language. An engine only has to parse a module far
//! enough to report its namespace, and evaluate a combined query against a document.

use crate::error::EngineError;
use crate::model::{Document, RawResultSet};
use crate::query::CombinedQuery;

/// A module the engine accepted.
pub trait ParsedModule {
    /// Label the module was parsed under.
    fn name(&self) -> &str;

    /// Declared package path, e.g. `data.slsa`. Used verbatim as the query prefix.
    fn namespace(&self) -> &str;
}

/// Pluggable rule-language capability.
///
/// Implementations must not keep state between calls: every `eval` works on its own
/// engine instance, so independent evaluations can run concurrently without locking.
pub trait RuleEngine {
    type Module: ParsedModule;

    fn parse(&self, name: &str, source: &str) -> Result<Self::Module, EngineError>;

    /// Evaluate `query` with `document` bound as input and every module loaded.
    ///
    /// Modules sharing a namespace are merged by the engine.
    fn eval(
        &self,
        document: &Document,
        modules: &[Self::Module],
        query: &CombinedQuery,
    ) -> Result<RawResultSet, EngineError>;
}

impl<E: RuleEngine + ?Sized> RuleEngine for &E {
    type Module = E::Module;

    fn parse(&self, name: &str, source: &str) -> Result<Self::Module, EngineError> {
        (**self).parse(name, source)
    }

    fn eval(
        &self,
        document: &Document,
        modules: &[Self::Module],
        query: &CombinedQuery,
    ) -> Result<RawResultSet, EngineError> {
        (**self).eval(document, modules, query)
    }
}
