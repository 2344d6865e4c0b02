//! Error types for operator construction, application, and solving.

use thiserror::Error;

/// Result type for operator operations.
pub type Result<T> = std::result::Result<T, OperatorError>;

/// Errors that can occur when building or using linear operators.
///
/// Composite operators never catch or reinterpret errors raised by their
/// children; a failure inside a leaf surfaces to the caller unchanged.
#[derive(Error, Debug)]
pub enum OperatorError {
    /// Input vector length inconsistent with the operator shape
    #[error("Dimension mismatch: operator expects input of length {expected}, got {got}")]
    DimensionMismatch {
        /// Length implied by the operator shape and apply mode
        expected: usize,
        /// Length of the supplied input
        got: usize,
    },

    /// Construction-time row-count conflict among concatenated children
    #[error("Inconsistent shape: operator {index} has {got} rows, expected {expected}")]
    InconsistentShape {
        /// Position (1-based) of the offending child operator
        index: usize,
        /// Row count shared by the preceding children
        expected: usize,
        /// Row count of the offending child
        got: usize,
    },

    /// A composite was built from unusable operands, or an operation was
    /// requested that the operator cannot perform
    #[error("Invalid operator: {message}")]
    InvalidOperator {
        /// Description of what made the operator unusable
        message: String,
    },

    /// Operation attempted on an operator whose shape was never activated
    #[error("Unresolved shape: operator must be activated before use")]
    UnresolvedShape,
}

impl OperatorError {
    /// Shorthand for an [`OperatorError::InvalidOperator`] with a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        OperatorError::InvalidOperator {
            message: message.into(),
        }
    }
}
