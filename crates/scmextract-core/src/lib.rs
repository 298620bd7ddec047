pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod interchange;
pub mod registry;
pub mod traits;
pub mod trajectory;

pub use config::{load_config, parse_config, save_config, ConfigError, ExperimentConfig};
pub use error::*;
pub use filter::*;
pub use graph::*;
pub use interchange::*;
pub use registry::*;
pub use traits::*;
pub use trajectory::*;
