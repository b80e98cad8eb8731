//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed input or violated tree preconditions.
/// These are independent of where the input came from.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("not enough operands for {operator}: needs {required}, stack holds {available}")]
    InsufficientOperands {
        operator: String,
        required: usize,
        available: usize,
    },

    #[error("{}", malformed_message(.remaining))]
    MalformedExpression { remaining: usize },

    #[error("invalid numeric literal: {token:?}")]
    NumericLiteral { token: String },

    #[error("cannot score against an empty dataset")]
    EmptyDataset,

    #[error("invalid input pair on line {line}: {reason}")]
    InvalidPair { line: usize, reason: String },

    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

fn malformed_message(remaining: &usize) -> String {
    if *remaining == 0 {
        "malformed expression: no expression to build".to_string()
    } else {
        format!("malformed expression: {remaining} trees left on stack, not enough operators")
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
