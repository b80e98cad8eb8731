//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add the input context
/// (which line, which source) they were raised for.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("expression on line {line} ({text:?}): {source}")]
    Expression {
        line: usize,
        text: String,
        #[source]
        source: DomainError,
    },

    #[error("input pairs: {source}")]
    Dataset {
        #[source]
        source: DomainError,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// The underlying domain error, if this failure came from the domain layer.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            ApplicationError::Domain(e)
            | ApplicationError::Expression { source: e, .. }
            | ApplicationError::Dataset { source: e } => Some(e),
            ApplicationError::Config { .. } | ApplicationError::OperationFailed { .. } => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
