//! Solve dispatcher.
//!
//! `solve` decides *how* a system `Op x = b` is solved: sweepable
//! operators expose their own structured [`direct_solve`]
//! (diagonal inversion, unitary adjoint, factor sweeps, ...), everything
//! else falls back to the iterative LSQR path driven purely by `apply`.
//!
//! [`direct_solve`]: crate::LinearOperator::direct_solve

use crate::error::{OperatorError, Result};
use crate::lsqr::{lsqr, LsqrOptions};
use crate::operator::{ApplyMode, LinearOperator};
use crate::scalar::Scalar;
use crate::util::{column, column_matrix, ncols, nrows, set_column, zeros, Matrix};

/// Least-squares solve of `Op x ≈ b` (`mode = Forward`) or
/// `Op^H x ≈ b` (`mode = Adjoint`) with default iterative options.
///
/// Columns of `b` are independent right-hand sides.
pub fn solve<T: Scalar>(
    op: &dyn LinearOperator<T>,
    b: &Matrix<T>,
    mode: ApplyMode,
) -> Result<Matrix<T>> {
    solve_with(op, b, mode, &LsqrOptions::default())
}

/// Like [`solve`], with explicit iterative-solver options.
///
/// The options only affect the fallback path; a sweepable operator is
/// dispatched to its direct solve regardless.
pub fn solve_with<T: Scalar>(
    op: &dyn LinearOperator<T>,
    b: &Matrix<T>,
    mode: ApplyMode,
    options: &LsqrOptions,
) -> Result<Matrix<T>> {
    let shape = op.shape();
    let expected = shape.output_len(mode)?;
    if nrows(b) != expected {
        return Err(OperatorError::DimensionMismatch {
            expected,
            got: nrows(b),
        });
    }

    if op.is_sweepable() {
        return op.direct_solve(b, mode);
    }

    let solution_len = shape.input_len(mode)?;
    let mut x = zeros(solution_len, ncols(b));
    for j in 0..ncols(b) {
        let rhs = column(b, j);
        let result = lsqr(
            |v| {
                let y = op.apply(&column_matrix(v), mode)?;
                Ok(column(&y, 0))
            },
            |u| {
                let y = op.apply(&column_matrix(u), mode.flipped())?;
                Ok(column(&y, 0))
            },
            &rhs,
            solution_len,
            options,
        )?;
        set_column(&mut x, j, &result.solution);
    }
    Ok(x)
}
