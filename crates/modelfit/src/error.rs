use std::path::PathBuf;

use smartcore::error::Failed;

/// Failures raised while fitting, scoring or reporting on a classifier.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("features have {features} rows but labels have {labels}")]
    ShapeMismatch { features: usize, labels: usize },

    #[error("invalid shape ({rows}, {cols}) for buffer of length {len}")]
    InvalidShape { rows: usize, cols: usize, len: usize },

    #[error("expected {expected} feature names, got {actual}")]
    FeatureNameCount { expected: usize, actual: usize },

    #[error("duplicate feature name '{0}'")]
    DuplicateFeature(String),

    #[error("feature column '{0}' has zero standard deviation")]
    ZeroVariance(String),

    #[error("feature column '{0}' contains NaN or infinite values")]
    NonFinite(String),

    #[error("labels must contain exactly two classes, found {0}")]
    NotBinary(usize),

    #[error("AUC is undefined when only one class is present ({context})")]
    UndefinedAuc { context: String },

    #[error("need at least 2 folds and no more folds than rows, got {folds} folds for {rows} rows")]
    InvalidFolds { folds: usize, rows: usize },

    #[error("model '{model}' does not expose {expected}")]
    MissingImportance { model: String, expected: &'static str },

    #[error("parameter '{0}' has no candidate values")]
    EmptyParameterValues(String),

    #[error("model '{model}' has no parameter '{name}'")]
    UnknownParameter { model: String, name: String },

    #[error("invalid value {value} for parameter '{name}'")]
    InvalidParameter { name: String, value: String },

    #[error("model '{0}' must be fitted before use")]
    NotFitted(String),

    #[error("output directory {0} does not exist or is not a directory")]
    OutputDir(PathBuf),

    #[error(transparent)]
    Model(#[from] Failed),
}
