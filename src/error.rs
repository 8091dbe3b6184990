/// Result type for training operations
pub type Result<T> = std::result::Result<T, DdpgError>;

/// Main error type for the crate
#[derive(Debug, thiserror::Error)]
pub enum DdpgError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Non-finite losses, parameters or actions
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Sampling from an empty replay buffer
    #[error("Empty buffer: {0}")]
    EmptyBuffer(String),

    /// Misuse of the training machinery, e.g. backward before forward
    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<bincode::Error> for DdpgError {
    fn from(err: bincode::Error) -> Self {
        DdpgError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl DdpgError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DdpgError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DdpgError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
