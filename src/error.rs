use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a run. Everything recoverable (unreadable auxiliary
/// files, malformed list lines, unwritable outputs) is logged instead.
#[derive(Error, Debug)]
pub enum SglError {
    #[error(
        "The responses must have the same number of columns as the feature set: \
         features have {features} samples, responses have {responses}."
    )]
    SampleCountMismatch { features: usize, responses: usize },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid data in '{}': {message}", path.display())]
    Data { path: PathBuf, message: String },

    #[error("invalid group layout: {0}")]
    InvalidGroups(String),

    #[error("invalid field vector: {0}")]
    InvalidField(String),

    #[error("invalid value '{value}' for SLEP option '{key}': {reason}")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid lambda pair ({lambda1}, {lambda2}): {reason}")]
    InvalidLambda {
        lambda1: f64,
        lambda2: f64,
        reason: String,
    },

    #[error("solver failure: {0}")]
    Solver(String),

    #[error("failed to write sweep report '{}': {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SglError {
    pub(crate) fn data(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Data {
            path: path.into(),
            message: message.into(),
        }
    }
}
