use crate::{evaluate_graph, GraphMetrics};
use scmextract_core::{
    save_graph, to_dot, CausalGraph, ExperimentConfig, Extractor, GraphFormat, Registry, Result,
    Simulator, VariableFilter,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything one experiment produced.
#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    pub name: String,
    pub simulator: String,
    pub extractor: String,
    pub predicted: CausalGraph,
    pub ground_truth: CausalGraph,
    pub metrics: GraphMetrics,
}

#[derive(Serialize)]
struct MetricsReport<'a> {
    experiment: &'a str,
    simulator: &'a str,
    extractor: &'a str,
    #[serde(flatten)]
    metrics: GraphMetrics,
    predicted_edges: usize,
    true_edges: usize,
}

impl ExperimentOutcome {
    /// Write `metrics.json`, `predicted.json` and `predicted.dot` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        let metrics_path = dir.join("metrics.json");
        let report = MetricsReport {
            experiment: &self.name,
            simulator: &self.simulator,
            extractor: &self.extractor,
            metrics: self.metrics,
            predicted_edges: self.predicted.num_edges(),
            true_edges: self.ground_truth.num_edges(),
        };
        fs::write(&metrics_path, serde_json::to_string_pretty(&report)?)?;

        let json_path = dir.join("predicted.json");
        save_graph(&self.predicted, &json_path, GraphFormat::Json)?;

        let dot_path = dir.join("predicted.dot");
        let title = format!("{} ({})", self.simulator, self.extractor);
        fs::write(&dot_path, to_dot(&self.predicted, &title))?;

        info!(dir = %dir.display(), "experiment results written");
        Ok(vec![metrics_path, json_path, dot_path])
    }
}

/// Run one extractor against one simulator and score the prediction.
///
/// Unknown names fail before any extraction happens. Without configured variables the
/// simulator's full variable list is the filter.
pub fn run_experiment(
    config: &ExperimentConfig,
    extractors: &Registry<dyn Extractor>,
    simulators: &Registry<dyn Simulator>,
) -> Result<ExperimentOutcome> {
    config.validate()?;
    let simulator = simulators.get(&config.simulator)?;
    let extractor = extractors.get(&config.extractor)?;

    let filter = match &config.variables {
        Some(variables) => VariableFilter::only(variables.iter().cloned()),
        None => VariableFilter::only(simulator.all_variables()),
    };

    info!(
        experiment = %config.name,
        simulator = simulator.name(),
        extractor = extractor.name(),
        "running experiment"
    );
    let outcome = evaluate_pair(simulator.as_ref(), extractor.as_ref(), &filter)?;
    Ok(ExperimentOutcome {
        name: config.name.clone(),
        ..outcome
    })
}

/// Extract from one simulator's source and compare against its ground truth.
pub(crate) fn evaluate_pair(
    simulator: &dyn Simulator,
    extractor: &dyn Extractor,
    filter: &VariableFilter,
) -> Result<ExperimentOutcome> {
    let source = simulator.source_text()?;
    let predicted = extractor.extract_from_str(&source, filter)?;
    let ground_truth = simulator.ground_truth();
    let metrics = evaluate_graph(&predicted, &ground_truth);

    info!(
        simulator = simulator.name(),
        extractor = extractor.name(),
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        shd = metrics.shd,
        "evaluation complete"
    );

    Ok(ExperimentOutcome {
        name: format!("{}_{}", simulator.name(), extractor.name()),
        simulator: simulator.name().to_string(),
        extractor: extractor.name().to_string(),
        predicted,
        ground_truth,
        metrics,
    })
}
