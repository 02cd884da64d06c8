use thiserror::Error;

/// Error types for the anafit library.
#[derive(Error, Debug)]
pub enum AnafitError {
    /// The definition string could not be compiled: bad syntax, unknown
    /// symbol, or an arity mismatch between the clause and the tuple.
    #[error("Malformed definition: {0}")]
    MalformedDefinition(String),

    /// The name is neither a built-in nor a custom model.
    #[error("Unknown fitting function: {0}")]
    UnknownFunction(String),

    /// A custom model with this name already exists.
    #[error("A custom fitting function named '{0}' already exists")]
    DuplicateName(String),

    /// The name belongs to a built-in model and cannot be shadowed.
    #[error("'{0}' is a built-in fitting function name")]
    ReservedName(String),

    /// The optimizer stopped without reaching its tolerances.
    #[error("Fit did not converge: {0}")]
    FitDidNotConverge(String),

    /// The covariance matrix could not be estimated at the optimum.
    #[error("Covariance could not be estimated: {0}")]
    SingularCovariance(String),

    /// The range filter left no data point to fit.
    #[error("No data point in the fit range ({xmin}, {xmax})")]
    EmptyFitRange {
        /// Lower (exclusive) bound
        xmin: f64,
        /// Upper (exclusive) bound
        xmax: f64,
    },

    /// The custom catalog could not be read or written.
    #[error("Catalog persistence error: {0}")]
    PersistenceError(String),

    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for AnafitError {
    fn from(err: std::io::Error) -> Self {
        AnafitError::PersistenceError(err.to_string())
    }
}

impl From<serde_json::Error> for AnafitError {
    fn from(err: serde_json::Error) -> Self {
        AnafitError::PersistenceError(format!("invalid catalog JSON: {}", err))
    }
}

/// Result type alias for anafit operations.
pub type Result<T> = std::result::Result<T, AnafitError>;
