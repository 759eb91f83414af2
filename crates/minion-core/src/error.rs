use thiserror::Error;

/// Failures raised by the work function itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkError {
    #[error("Singular system: pivot {pivot:e} in column {column}")]
    Singular { column: usize, pivot: f64 },

    #[error("Shape mismatch: expected {expected} rows, got {actual}")]
    Shape { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Invalid task size: {0} (must be positive)")]
    InvalidSize(usize),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Work function failed: {0}")]
    Work(#[from] WorkError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
