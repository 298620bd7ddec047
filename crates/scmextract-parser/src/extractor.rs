use crate::{DependencyVisitor, SourceParser};
use scmextract_core::{CausalGraph, Extractor, Registry, Result, VariableFilter};
use tracing::info;

/// Extract causal graphs from Python source using AST parsing.
///
/// Dependencies come from direct assignments and `owner.append(..)` calls, collected in a
/// single traversal. A recurrence such as `x = x + 1` contributes no `x -> x` edge. With a
/// filter, every admitted name appears as a node even when nothing references it.
pub struct AstExtractor {
    parser: SourceParser,
}

impl AstExtractor {
    pub const NAME: &'static str = "ast";

    pub fn new() -> Self {
        Self {
            parser: SourceParser::python(),
        }
    }
}

impl Default for AstExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for AstExtractor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extract_from_str(&self, source: &str, filter: &VariableFilter) -> Result<CausalGraph> {
        let parsed = self.parser.parse(source)?;

        let mut visitor = DependencyVisitor::new(parsed.source(), filter);
        visitor.visit(parsed.root());
        let dependencies = visitor.into_dependencies();

        let graph = CausalGraph::from_dependencies(&dependencies, filter.ordering())
            .with_metadata("extractor", Self::NAME);
        info!(
            extractor = Self::NAME,
            targets = dependencies.len(),
            variables = graph.num_variables(),
            edges = graph.num_edges(),
            "extraction complete"
        );
        Ok(graph)
    }
}

/// Every extractor this crate provides, keyed by name.
pub fn extractors() -> Registry<dyn Extractor> {
    Registry::builder("extractor")
        .register(
            AstExtractor::NAME,
            "Extract causal graphs from Python source using AST parsing",
            || Box::new(AstExtractor::new()) as Box<dyn Extractor>,
        )
        .build()
}
