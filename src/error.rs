use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by every stage of the pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("column '{column}' not found in {}", path.display())]
    ColumnNotFound { path: PathBuf, column: String },

    #[error("cannot convert value {value:?} in column '{column}' (row {row}) of {}", path.display())]
    Conversion {
        path: PathBuf,
        column: String,
        row: usize,
        value: String,
    },

    #[error("{model} failed: {reason}")]
    ModelFit { model: String, reason: String },

    #[error("no viable model: classical forecaster failed ({classical}); linear regression failed ({linear})")]
    NoViableModel { classical: String, linear: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("data error: {0}")]
    Data(String),

    #[error("experiment tracking error: {0}")]
    Tracking(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("computation error: {0}")]
    ComputationError(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot access {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[source] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[source] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[source] serde_yaml::Error),

    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap any failure raised while fitting or forecasting a candidate
    pub fn model_fit(model: impl Into<String>, cause: &Error) -> Self {
        Error::ModelFit {
            model: model.into(),
            reason: cause.to_string(),
        }
    }

    /// Attach the path an I/O failure happened on
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::File {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidRegex(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
