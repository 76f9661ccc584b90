//! Error taxonomy shared by the library modules.

use thiserror::Error;

/// Errors raised while loading notes, fitting the classifier or evaluating explanations.
#[derive(Debug, Error)]
pub enum LosError {
    /// A required column is absent from the input header.
    #[error("input is missing required column {column:?}")]
    MissingColumn { column: String },

    /// The outcome column holds something other than a binary value.
    #[error("row {row}: cannot parse label {value:?} as binary outcome")]
    InvalidLabel { row: usize, value: String },

    /// No rows survived loading or selection.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Training data must contain both outcome classes.
    #[error("training data contains a single class ({0}); need both outcomes")]
    SingleClass(u8),

    /// A tunable is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The logistic regression solver failed.
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Inference returned an unexpected number of scores.
    #[error("inference error: {0}")]
    Inference(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote chat-completion call failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("plot error: {0}")]
    Plot(String),
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, LosError>;
