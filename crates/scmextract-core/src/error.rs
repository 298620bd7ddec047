use crate::config::ConfigError;
use thiserror::Error;

/// Syntax error reported by the source parser.
///
/// Positions are 1-based. An extraction that hits one of these produces no graph at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Relation shape {actual:?} doesn't match {expected:?} for the declared variables")]
    Shape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Unknown {kind}: '{name}'. Available: {available:?}")]
    UnknownImplementation {
        kind: &'static str,
        name: String,
        available: Vec<String>,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(String),
}

impl ScmError {
    /// Failures a benchmark driver may skip over: bad source text or unreadable source files.
    pub fn is_input_failure(&self) -> bool {
        matches!(self, ScmError::Parse(_) | ScmError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, ScmError>;
