//! Error types for channel algebra.

use thiserror::Error;

use crate::linalg::Matrix;

/// Errors raised by the numerical routines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TheoryError {
    /// An input has the wrong shape for the operation.
    #[error("{context}: unexpected {rows}x{cols} matrix")]
    Dimension {
        /// What was being checked.
        context: String,
        /// Row count of the offending input.
        rows: usize,
        /// Column count of the offending input.
        cols: usize,
    },

    /// A decomposition failed or produced values outside tolerance.
    #[error("Numerical error: {message}")]
    Numerical {
        /// Description of the failure.
        message: String,
        /// The matrix that triggered it.
        matrix: Box<Matrix>,
    },

    /// A matrix is not a valid density matrix.
    #[error("Invalid quantum state: {0}")]
    InvalidState(String),
}

impl TheoryError {
    pub(crate) fn dimension(context: impl Into<String>, rows: usize, cols: usize) -> Self {
        TheoryError::Dimension {
            context: context.into(),
            rows,
            cols,
        }
    }

    pub(crate) fn numerical(message: impl Into<String>, matrix: &Matrix) -> Self {
        TheoryError::Numerical {
            message: message.into(),
            matrix: Box::new(matrix.clone()),
        }
    }
}

/// Result type for channel algebra.
pub type TheoryResult<T> = Result<T, TheoryError>;
