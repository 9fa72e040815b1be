// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExperimentError>;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("trigger error: {0}")]
    Trigger(String),

    /// A key outside the response list, or several keys at once.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("experiment terminated by the operator")]
    ExitRequested,

    #[error("no behavioural data found in {0}")]
    NoResults(String),
}
