use std::time::Duration;

/// Errors returned by [`crate::LinearSvc::fit`]. A failed fit never yields a
/// partially trained model.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("got {features} feature vectors but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },
    #[error("feature vectors must not be empty")]
    EmptyFeatureVector,
    #[error("feature vector {index} has length {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },
    #[error("feature vector {index} contains a non-finite value")]
    NonFinite { index: usize },
    #[error("training needs at least two distinct labels, got only {label:?}")]
    SingleClass { label: String },
    #[error("invalid SVC parameters: {0}")]
    InvalidParams(&'static str),
    #[error("solver did not converge for class {class:?} within {iterations} iterations")]
    Convergence { class: String, iterations: usize },
    #[error("training exceeded its deadline of {0:?}")]
    Timeout(Duration),
    #[error("training cancelled")]
    Cancelled,
}

/// Errors returned by prediction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    #[error("feature vector {index} has length {got}, model expects {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ModelIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("inconsistent model file: {0}")]
    Inconsistent(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("got {truth} true labels but {predicted} predictions")]
    LengthMismatch { truth: usize, predicted: usize },
    #[error("no samples to score")]
    Empty,
}
