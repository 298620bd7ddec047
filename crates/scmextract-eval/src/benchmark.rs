// ABOUTME: Parallel benchmark of every (simulator, extractor) pair.
// ABOUTME: Malformed or unreadable sources skip a single pair; the rest still run.

use crate::experiment::{evaluate_pair, ExperimentOutcome};
use crate::GraphMetrics;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use scmextract_core::{to_dot, Extractor, GraphFormat, Registry, Result, Simulator, VariableFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Which registry keys to benchmark; an empty list selects every registered key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkSelection {
    pub simulators: Vec<String>,
    pub extractors: Vec<String>,
}

impl BenchmarkSelection {
    pub fn all() -> Self {
        Self::default()
    }

    fn resolve<T: ?Sized>(requested: &[String], registry: &Registry<T>) -> Result<Vec<String>> {
        if requested.is_empty() {
            return Ok(registry.names().into_iter().map(String::from).collect());
        }
        let mut names = Vec::with_capacity(requested.len());
        for name in requested {
            // Surfaces UnknownImplementation before any work is scheduled.
            registry.get(name)?;
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// One scored pair, flattened for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub simulator: String,
    pub extractor: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub shd: usize,
    pub predicted_edges: usize,
    pub true_edges: usize,
}

impl BenchmarkRecord {
    fn from_outcome(outcome: &ExperimentOutcome) -> Self {
        let GraphMetrics {
            precision,
            recall,
            f1,
            shd,
        } = outcome.metrics;
        Self {
            simulator: outcome.simulator.clone(),
            extractor: outcome.extractor.clone(),
            precision,
            recall,
            f1,
            shd,
            predicted_edges: outcome.predicted.num_edges(),
            true_edges: outcome.ground_truth.num_edges(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPair {
    pub simulator: String,
    pub extractor: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub timestamp: DateTime<Utc>,
    pub simulators: Vec<String>,
    pub extractors: Vec<String>,
    pub outcomes: Vec<ExperimentOutcome>,
    pub skipped: Vec<SkippedPair>,
}

#[derive(Serialize)]
struct Summary<'a> {
    timestamp: String,
    simulators: &'a [String],
    extractors: &'a [String],
    results: Vec<BenchmarkRecord>,
    skipped: &'a [SkippedPair],
}

const CSV_HEADER: &str = "simulator,extractor,precision,recall,f1,shd,predicted_edges,true_edges";

impl BenchmarkReport {
    pub fn records(&self) -> Vec<BenchmarkRecord> {
        self.outcomes.iter().map(BenchmarkRecord::from_outcome).collect()
    }

    pub fn to_csv(&self) -> String {
        let mut lines = vec![CSV_HEADER.to_string()];
        for r in self.records() {
            lines.push(format!(
                "{},{},{:.4},{:.4},{:.4},{},{},{}",
                csv_field(&r.simulator),
                csv_field(&r.extractor),
                r.precision,
                r.recall,
                r.f1,
                r.shd,
                r.predicted_edges,
                r.true_edges
            ));
        }
        lines.join("\n") + "\n"
    }

    /// Write `summary.json`, `summary.csv` and `<simulator>/<extractor>/predicted.{json,dot}`.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let summary = Summary {
            timestamp: self.timestamp.to_rfc3339(),
            simulators: &self.simulators,
            extractors: &self.extractors,
            results: self.records(),
            skipped: &self.skipped,
        };
        let json_path = dir.join("summary.json");
        fs::write(&json_path, serde_json::to_string_pretty(&summary)?)?;
        written.push(json_path);

        let csv_path = dir.join("summary.csv");
        fs::write(&csv_path, self.to_csv())?;
        written.push(csv_path);

        for outcome in &self.outcomes {
            let pair_dir = dir.join(&outcome.simulator).join(&outcome.extractor);
            let graph_path = pair_dir.join("predicted.json");
            scmextract_core::save_graph(&outcome.predicted, &graph_path, GraphFormat::Json)?;
            let dot_path = pair_dir.join("predicted.dot");
            let title = format!("{} ({})", outcome.simulator, outcome.extractor);
            fs::write(&dot_path, to_dot(&outcome.predicted, &title))?;
            written.push(graph_path);
            written.push(dot_path);
        }

        info!(dir = %dir.display(), files = written.len(), "benchmark report written");
        Ok(written)
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Score every selected (simulator, extractor) pair, one rayon task per pair.
///
/// Unknown names abort the run before any pair starts. A parse or I/O failure in one
/// pair is logged and recorded in [`BenchmarkReport::skipped`]; any other error aborts.
/// Outcomes are ordered by simulator, then extractor.
pub fn run_benchmark(
    extractors: &Registry<dyn Extractor>,
    simulators: &Registry<dyn Simulator>,
    selection: &BenchmarkSelection,
) -> Result<BenchmarkReport> {
    let simulator_names = BenchmarkSelection::resolve(&selection.simulators, simulators)?;
    let extractor_names = BenchmarkSelection::resolve(&selection.extractors, extractors)?;

    let pairs: Vec<(&str, &str)> = simulator_names
        .iter()
        .flat_map(|sim| extractor_names.iter().map(move |ext| (sim.as_str(), ext.as_str())))
        .collect();
    info!(pairs = pairs.len(), "starting benchmark");

    let results: Vec<(&str, &str, Result<ExperimentOutcome>)> = pairs
        .par_iter()
        .map(|&(sim_name, ext_name)| {
            let result = simulators.get(sim_name).and_then(|simulator| {
                let extractor = extractors.get(ext_name)?;
                let filter = VariableFilter::only(simulator.all_variables());
                evaluate_pair(simulator.as_ref(), extractor.as_ref(), &filter)
            });
            (sim_name, ext_name, result)
        })
        .collect();

    let mut outcomes = Vec::new();
    let mut skipped = Vec::new();
    for (simulator, extractor, result) in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) if err.is_input_failure() => {
                warn!(simulator, extractor, error = %err, "skipping pair");
                skipped.push(SkippedPair {
                    simulator: simulator.to_string(),
                    extractor: extractor.to_string(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        completed = outcomes.len(),
        skipped = skipped.len(),
        "benchmark complete"
    );
    Ok(BenchmarkReport {
        timestamp: Utc::now(),
        simulators: simulator_names,
        extractors: extractor_names,
        outcomes,
        skipped,
    })
}
