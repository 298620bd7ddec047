// ABOUTME: SIR epidemic simulator with a known causal structure.
// ABOUTME: Ships the Python model source that extractors analyse alongside native dynamics.

use scmextract_core::{dependency_map, CausalGraph, Result, Simulator, Trajectory};
use std::path::PathBuf;
use tracing::debug;

const SIR_SOURCE: &str = include_str!("../models/sir.py");

/// SIR (Susceptible-Infected-Resistant) epidemic model.
///
/// Dynamics, with `beta = rateSI`, `gamma = rateIR` and `N` the total population:
///
/// ```text
/// dS/dt = -beta * S * I / N
/// dI/dt =  beta * S * I / N - gamma * I
/// dR/dt =  gamma * I
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SirSimulator {
    pub initial_susceptible: f64,
    pub initial_infected: f64,
    pub initial_resistant: f64,
    pub rate_si: f64,
    pub rate_ir: f64,
}

impl Default for SirSimulator {
    fn default() -> Self {
        Self::new(950.0, 50.0, 0.0, 0.05, 0.01)
    }
}

impl SirSimulator {
    pub const NAME: &'static str = "sir";

    pub fn new(susceptible: f64, infected: f64, resistant: f64, rate_si: f64, rate_ir: f64) -> Self {
        Self {
            initial_susceptible: susceptible,
            initial_infected: infected,
            initial_resistant: resistant,
            rate_si,
            rate_ir,
        }
    }

    pub fn population(&self) -> f64 {
        self.initial_susceptible + self.initial_infected + self.initial_resistant
    }
}

impl Simulator for SirSimulator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn source_path(&self) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models").join("sir.py")
    }

    fn source_text(&self) -> Result<String> {
        Ok(SIR_SOURCE.to_string())
    }

    fn state_variables(&self) -> Vec<String> {
        ["Susceptible", "Infected", "Resistant"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn all_variables(&self) -> Vec<String> {
        [
            "Susceptible",
            "Infected",
            "Resistant",
            "S_to_I",
            "I_to_R",
            "rateSI",
            "rateIR",
            "numIndividuals",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Each compartment depends on its own previous value plus the flows through it:
    /// - `S_to_I = f(rateSI, Susceptible, Infected, numIndividuals)`
    /// - `I_to_R = f(Infected, rateIR)`
    /// - `Susceptible_t = f(Susceptible_{t-1}, S_to_I)`
    /// - `Infected_t = f(Infected_{t-1}, S_to_I, I_to_R)`
    /// - `Resistant_t = f(Resistant_{t-1}, I_to_R)`
    fn ground_truth(&self) -> CausalGraph {
        let dependencies = dependency_map([
            ("S_to_I", vec!["rateSI", "Susceptible", "Infected", "numIndividuals"]),
            ("I_to_R", vec!["Infected", "rateIR"]),
            ("Susceptible", vec!["Susceptible", "S_to_I"]),
            ("Infected", vec!["Infected", "S_to_I", "I_to_R"]),
            ("Resistant", vec!["Resistant", "I_to_R"]),
        ]);
        CausalGraph::from_dependencies(&dependencies, Some(self.all_variables()))
            .with_metadata("simulator", Self::NAME)
    }

    /// Forward update for `steps` rows; at least the initial state is always returned.
    fn run(&self, steps: usize) -> Trajectory {
        let rows = steps.max(1);
        let mut susceptible = Vec::with_capacity(rows);
        let mut infected = Vec::with_capacity(rows);
        let mut resistant = Vec::with_capacity(rows);
        susceptible.push(self.initial_susceptible);
        infected.push(self.initial_infected);
        resistant.push(self.initial_resistant);

        let population = self.population();
        for _ in 1..rows {
            let (s, i, r) = (
                susceptible[susceptible.len() - 1],
                infected[infected.len() - 1],
                resistant[resistant.len() - 1],
            );
            let s_to_i = if population > 0.0 {
                self.rate_si * s * i / population
            } else {
                0.0
            };
            let i_to_r = i * self.rate_ir;

            susceptible.push(s - s_to_i);
            infected.push(i + s_to_i - i_to_r);
            resistant.push(r + i_to_r);
        }

        debug!(rows, population, "sir run complete");
        Trajectory::from_series([
            ("Susceptible", susceptible),
            ("Infected", infected),
            ("Resistant", resistant),
        ])
    }
}
