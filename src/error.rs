use thiserror::Error;

/// Error types for the specfit-rs library.
#[derive(Error, Debug)]
pub enum FitError {
    /// Parameter arrays whose length does not match the parameter count.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The solver reported a failure status.
    #[error("Fit failed: {0}")]
    SolverFailure(String),

    /// An operation was requested before the state it needs exists.
    #[error("Invalid state: {0}")]
    State(String),

    /// Error indicating a mismatch in array dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error during model function evaluation.
    #[error("Function evaluation error: {0}")]
    FunctionEvaluation(String),

    /// The independent axis could not be converted to the fit unit.
    #[error("Unit conversion error: {0}")]
    UnitConversion(String),

    /// A tie expression could not be parsed or evaluated.
    #[error("Expression error: {0}")]
    Expression(#[from] crate::parinfo::tied::ExpressionError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for specfit-rs operations.
pub type Result<T> = std::result::Result<T, FitError>;
