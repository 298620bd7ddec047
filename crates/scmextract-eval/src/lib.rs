pub mod benchmark;
pub mod experiment;
pub mod metrics;

pub use benchmark::{run_benchmark, BenchmarkRecord, BenchmarkReport, BenchmarkSelection, SkippedPair};
pub use experiment::{run_experiment, ExperimentOutcome};
pub use metrics::*;
