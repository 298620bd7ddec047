// ABOUTME: Edge-set comparison metrics between a predicted and a reference causal graph.
// ABOUTME: Edges are matched by (parent, child) name, independent of variable ordering.

use scmextract_core::CausalGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

type Edge<'g> = (&'g str, &'g str);

fn edge_set(graph: &CausalGraph) -> BTreeSet<Edge<'_>> {
    graph.edge_pairs().collect()
}

/// Edge-level agreement between a predicted graph and the truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeComparison<'g> {
    pub true_positives: BTreeSet<Edge<'g>>,
    pub false_positives: BTreeSet<Edge<'g>>,
    pub false_negatives: BTreeSet<Edge<'g>>,
}

impl<'g> EdgeComparison<'g> {
    pub fn new(predicted: &'g CausalGraph, truth: &'g CausalGraph) -> Self {
        let predicted = edge_set(predicted);
        let truth = edge_set(truth);
        Self {
            true_positives: predicted.intersection(&truth).copied().collect(),
            false_positives: predicted.difference(&truth).copied().collect(),
            false_negatives: truth.difference(&predicted).copied().collect(),
        }
    }

    pub fn num_predicted(&self) -> usize {
        self.true_positives.len() + self.false_positives.len()
    }

    pub fn num_truth(&self) -> usize {
        self.true_positives.len() + self.false_negatives.len()
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives.len(), self.num_predicted(), self.num_truth())
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives.len(), self.num_truth(), self.num_predicted())
    }

    pub fn f1(&self) -> f64 {
        harmonic_mean(self.precision(), self.recall())
    }

    /// False positives plus false negatives; a reversed edge counts twice.
    pub fn shd(&self) -> usize {
        self.false_positives.len() + self.false_negatives.len()
    }

    pub fn metrics(&self) -> GraphMetrics {
        GraphMetrics {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            shd: self.shd(),
        }
    }
}

/// `hits / total`, or 1.0 when both sides are empty and 0.0 when only `total` is.
fn ratio(hits: usize, total: usize, other_total: usize) -> f64 {
    if total == 0 {
        return if other_total == 0 { 1.0 } else { 0.0 };
    }
    hits as f64 / total as f64
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}

/// All four scores for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub shd: usize,
}

pub fn precision(predicted: &CausalGraph, truth: &CausalGraph) -> f64 {
    EdgeComparison::new(predicted, truth).precision()
}

pub fn recall(predicted: &CausalGraph, truth: &CausalGraph) -> f64 {
    EdgeComparison::new(predicted, truth).recall()
}

pub fn f1_score(predicted: &CausalGraph, truth: &CausalGraph) -> f64 {
    EdgeComparison::new(predicted, truth).f1()
}

pub fn structural_hamming_distance(predicted: &CausalGraph, truth: &CausalGraph) -> usize {
    EdgeComparison::new(predicted, truth).shd()
}

pub fn evaluate_graph(predicted: &CausalGraph, truth: &CausalGraph) -> GraphMetrics {
    EdgeComparison::new(predicted, truth).metrics()
}
