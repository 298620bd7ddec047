use crate::{CausalGraph, Result, Trajectory, VariableFilter};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A method that infers a causal graph from program source text.
pub trait Extractor: Send + Sync {
    /// Registry key of this extractor.
    fn name(&self) -> &'static str;

    /// Extract a causal graph from in-memory source text.
    fn extract_from_str(&self, source: &str, filter: &VariableFilter) -> Result<CausalGraph>;

    /// Extract a causal graph from a source file.
    fn extract(&self, path: &Path, filter: &VariableFilter) -> Result<CausalGraph> {
        debug!(extractor = self.name(), path = %path.display(), "reading source");
        let source = std::fs::read_to_string(path)?;
        self.extract_from_str(&source, filter)
    }
}

/// A simulator whose causal structure is known by construction.
pub trait Simulator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Location of the program text an extractor should analyse.
    fn source_path(&self) -> PathBuf;

    /// The program text itself. Reads [`Simulator::source_path`] unless overridden.
    fn source_text(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self.source_path())?)
    }

    fn state_variables(&self) -> Vec<String>;

    /// Every variable relevant for extraction: state, parameters and intermediates.
    fn all_variables(&self) -> Vec<String> {
        self.state_variables()
    }

    fn ground_truth(&self) -> CausalGraph;

    /// Run the dynamics for `steps` rows, the first row being the initial state.
    fn run(&self, steps: usize) -> Trajectory;
}
