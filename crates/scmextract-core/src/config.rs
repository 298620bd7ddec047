use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// A single extraction experiment: which simulator to analyse, with which extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Experiment identifier, also the name of its output directory
    pub name: String,

    /// Registry key of the simulator to analyse
    pub simulator: String,

    /// Registry key of the extraction method
    pub extractor: String,

    /// Variables to extract; the simulator's full variable list when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<String>>,

    /// Directory for results
    #[serde(default = "default_output_dir", skip_serializing_if = "is_default_output_dir")]
    pub output_dir: PathBuf,

    /// Additional method-specific options
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn is_default_output_dir(dir: &PathBuf) -> bool {
    *dir == default_output_dir()
}

impl ExperimentConfig {
    pub fn new(
        name: impl Into<String>,
        simulator: impl Into<String>,
        extractor: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            simulator: simulator.into(),
            extractor: extractor.into(),
            variables: None,
            output_dir: default_output_dir(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = Some(variables.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Directory this experiment writes into: `output_dir/name`.
    pub fn result_dir(&self) -> PathBuf {
        self.output_dir.join(&self.name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("name", &self.name),
            ("simulator", &self.simulator),
            ("extractor", &self.extractor),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "required field '{field}' is empty"
                )));
            }
        }
        Ok(())
    }
}

/// Parse an experiment configuration from YAML text.
pub fn parse_config(text: &str) -> Result<ExperimentConfig, ConfigError> {
    let config: ExperimentConfig =
        serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load an experiment configuration from a YAML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ExperimentConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(format!("{}: {e}", path.display())))?;
    let config = parse_config(&text)?;
    debug!(path = %path.display(), experiment = %config.name, "loaded experiment config");
    Ok(config)
}

/// Write an experiment configuration as YAML, omitting defaulted fields.
pub fn save_config(config: &ExperimentConfig, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::ReadError(format!("{}: {e}", parent.display())))?;
    }

    let text = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    std::fs::write(path, text).map_err(|e| ConfigError::ReadError(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "saved experiment config");
    Ok(())
}
