pub mod sir;

pub use sir::*;

use scmextract_core::{Registry, Simulator};

/// Every simulator this crate provides, keyed by name.
pub fn simulators() -> Registry<dyn Simulator> {
    Registry::builder("simulator")
        .register(
            SirSimulator::NAME,
            "SIR epidemic model simulator",
            || Box::new(SirSimulator::default()) as Box<dyn Simulator>,
        )
        .build()
}
