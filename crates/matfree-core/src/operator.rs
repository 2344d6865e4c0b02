//! The abstract linear-operator contract.
//!
//! Everything in this workspace — leaves, concatenations, tensor products —
//! implements [`LinearOperator`]. The contract is an action on vector
//! batches (`apply`), capability flags, and an optional structured solve.
//! Operators are immutable once their shape is resolved, so trees can be
//! shared freely across threads.

use crate::error::{OperatorError, Result};
use crate::scalar::Scalar;
use crate::util::{nrows, Matrix};

/// Direction of an operator application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    /// Compute `Op * x`.
    Forward,
    /// Compute `Op^H * x` (conjugate transpose).
    Adjoint,
}

impl ApplyMode {
    /// The opposite mode.
    pub fn flipped(self) -> Self {
        match self {
            ApplyMode::Forward => ApplyMode::Adjoint,
            ApplyMode::Adjoint => ApplyMode::Forward,
        }
    }
}

/// Operator dimensions, possibly not yet bound to a data source.
///
/// An operator built against a data source whose size is not known yet
/// carries `Unresolved` until [`LinearOperator::activate`] binds it; the
/// deferred state is explicit rather than a sentinel value, and `apply`
/// or `solve` on an unresolved operator fail with
/// [`OperatorError::UnresolvedShape`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Fully determined dimensions.
    Resolved {
        /// Output length of a forward application.
        rows: usize,
        /// Input length of a forward application.
        cols: usize,
    },
    /// Deferred until activation.
    Unresolved,
}

impl Shape {
    /// A resolved `(rows, cols)` shape.
    pub fn resolved(rows: usize, cols: usize) -> Self {
        Shape::Resolved { rows, cols }
    }

    /// Whether the dimensions are known.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Shape::Resolved { .. })
    }

    /// Row count, or `UnresolvedShape`.
    pub fn rows(&self) -> Result<usize> {
        match self {
            Shape::Resolved { rows, .. } => Ok(*rows),
            Shape::Unresolved => Err(OperatorError::UnresolvedShape),
        }
    }

    /// Column count, or `UnresolvedShape`.
    pub fn cols(&self) -> Result<usize> {
        match self {
            Shape::Resolved { cols, .. } => Ok(*cols),
            Shape::Unresolved => Err(OperatorError::UnresolvedShape),
        }
    }

    /// Expected input length for the given mode (`cols` forward, `rows`
    /// adjoint).
    pub fn input_len(&self, mode: ApplyMode) -> Result<usize> {
        match mode {
            ApplyMode::Forward => self.cols(),
            ApplyMode::Adjoint => self.rows(),
        }
    }

    /// Output length for the given mode (`rows` forward, `cols` adjoint).
    pub fn output_len(&self, mode: ApplyMode) -> Result<usize> {
        self.input_len(mode.flipped())
    }
}

/// A linear map represented by its action on vectors.
///
/// `x` is always a matrix whose columns are independent vectors, so one
/// call covers batched application. Implementations are pure functions of
/// their input given fixed internal state; after construction (or
/// activation, for deferred shapes) nothing is mutated.
pub trait LinearOperator<T: Scalar>: Send + Sync {
    /// Operator dimensions.
    fn shape(&self) -> Shape;

    /// Whether applying the operator can produce complex output.
    fn is_complex(&self) -> bool;

    /// Whether the map is linear. Composites combine this conservatively
    /// (AND over children).
    fn is_linear(&self) -> bool {
        true
    }

    /// Whether `Op * x = b` admits a direct (non-iterative) solve via
    /// [`LinearOperator::direct_solve`].
    fn is_sweepable(&self) -> bool {
        false
    }

    /// Apply the operator (`mode = Forward`) or its conjugate transpose
    /// (`mode = Adjoint`) to each column of `x`.
    ///
    /// # Errors
    ///
    /// [`OperatorError::DimensionMismatch`] if `x` has the wrong row
    /// count, [`OperatorError::UnresolvedShape`] if the shape was never
    /// activated.
    fn apply(&self, x: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>>;

    /// Directly solve `Op * x = b` (forward) or `Op^H * x = b` (adjoint).
    ///
    /// Only meaningful when [`LinearOperator::is_sweepable`] is true; the
    /// default implementation reports the missing capability.
    fn direct_solve(&self, _b: &Matrix<T>, _mode: ApplyMode) -> Result<Matrix<T>> {
        Err(OperatorError::invalid(
            "operator does not support direct solving",
        ))
    }

    /// Bind a deferred shape to the length of the vectors the operator
    /// will consume.
    ///
    /// A no-op on an already-resolved operator; shape, flags, and any
    /// cached application order are frozen afterwards. Operators without
    /// a deferred-shape facility keep the default, which only accepts the
    /// already-resolved case.
    fn activate(&mut self, _cols: usize) -> Result<()> {
        match self.shape() {
            Shape::Resolved { .. } => Ok(()),
            Shape::Unresolved => Err(OperatorError::UnresolvedShape),
        }
    }
}

/// Verify that `x` has the row count the operator expects in `mode`.
pub fn check_input<T: Scalar>(shape: Shape, x: &Matrix<T>, mode: ApplyMode) -> Result<()> {
    let expected = shape.input_len(mode)?;
    let got = nrows(x);
    if got != expected {
        return Err(OperatorError::DimensionMismatch { expected, got });
    }
    Ok(())
}
