//! Error types for income disparity analysis
//!
//! Provides a unified error type for all disparity crates. Record-level
//! rejections live in [`crate::cleaner::RecordError`] because they are
//! recovered by exclusion and never abort a computation.

use thiserror::Error;

/// Core error type for disparity computations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too few observations for a variance-based computation
    #[error("Insufficient sample: expected at least {expected} observations, got {actual}")]
    InsufficientSample { expected: usize, actual: usize },

    /// A two-group comparison was requested on a variable without exactly two levels
    #[error("Field `{field}` must have exactly 2 observed levels, found {}: [{}]", levels.len(), levels.join(", "))]
    InputCardinality { field: String, levels: Vec<String> },

    /// The design matrix is not of full column rank
    #[error("Singular design matrix: rank {rank} < {columns} columns (degenerate terms: {})", terms.join(", "))]
    SingularDesign {
        terms: Vec<String>,
        rank: usize,
        columns: usize,
    },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// IO error (for configuration files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration document
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a sample below the minimum size
    pub fn insufficient(expected: usize, actual: usize) -> Self {
        Self::InsufficientSample { expected, actual }
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for a failed distribution construction
    pub fn distribution(name: &str, err: impl std::fmt::Display) -> Self {
        Self::Computation(format!("Failed to create {name} distribution: {err}"))
    }

    /// Stable snake_case name of the variant, for structured reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::InvalidInput(_) => "invalid_input",
            Self::InsufficientSample { .. } => "insufficient_sample",
            Self::InputCardinality { .. } => "input_cardinality",
            Self::SingularDesign { .. } => "singular_design",
            Self::Computation(_) => "computation",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
        }
    }
}
