//! Leaf operators.
//!
//! These are the concrete operators the composition engine is exercised
//! with: the dense-matrix lift (any raw numeric array becomes an
//! operator), the identity, a diagonal scaling, and a unitary DFT. Heavier
//! transform kernels live outside this workspace and plug in through the
//! same [`LinearOperator`] contract.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::{OperatorError, Result};
use crate::operator::{check_input, ApplyMode, LinearOperator, Shape};
use crate::scalar::Scalar;
use crate::util::{adjoint_mat_mul, mat_mul, ncols, nrows, zeros, Matrix};

/// Dense matrix lifted to the operator contract.
///
/// Forward apply is an ordinary matrix product, adjoint apply multiplies
/// by the conjugate transpose. This is the "constant operator" any raw
/// numeric array is wrapped into when handed to a composite constructor.
pub struct MatrixOperator<T: Scalar> {
    data: Matrix<T>,
}

impl<T: Scalar> MatrixOperator<T> {
    /// Wrap a dense matrix.
    pub fn new(data: Matrix<T>) -> Self {
        Self { data }
    }

    /// Wrap a matrix given as nested row vectors.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        Self::new(crate::util::from_vec2d(rows))
    }

    /// The wrapped matrix.
    pub fn data(&self) -> &Matrix<T> {
        &self.data
    }
}

impl<T: Scalar> LinearOperator<T> for MatrixOperator<T> {
    fn shape(&self) -> Shape {
        Shape::resolved(nrows(&self.data), ncols(&self.data))
    }

    fn is_complex(&self) -> bool {
        T::IS_COMPLEX
    }

    fn apply(&self, x: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>> {
        check_input(self.shape(), x, mode)?;
        Ok(match mode {
            ApplyMode::Forward => mat_mul(&self.data, x),
            ApplyMode::Adjoint => adjoint_mat_mul(&self.data, x),
        })
    }
}

/// The identity map, with an optionally deferred size.
pub struct IdentityOperator {
    shape: Shape,
}

impl IdentityOperator {
    /// Identity of a known size.
    pub fn new(n: usize) -> Self {
        Self {
            shape: Shape::resolved(n, n),
        }
    }

    /// Identity whose size is bound later via `activate`.
    pub fn deferred() -> Self {
        Self {
            shape: Shape::Unresolved,
        }
    }
}

impl<T: Scalar> LinearOperator<T> for IdentityOperator {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn is_complex(&self) -> bool {
        false
    }

    fn is_sweepable(&self) -> bool {
        true
    }

    fn apply(&self, x: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>> {
        check_input(self.shape, x, mode)?;
        Ok(x.clone())
    }

    fn direct_solve(&self, b: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>> {
        check_input(self.shape, b, mode.flipped())?;
        Ok(b.clone())
    }

    fn activate(&mut self, cols: usize) -> Result<()> {
        if !self.shape.is_resolved() {
            self.shape = Shape::resolved(cols, cols);
        }
        Ok(())
    }
}

/// Scaling by a diagonal vector.
///
/// Sweepable: the direct solve divides by the diagonal entries and fails
/// rather than producing infinities when an entry is zero.
pub struct DiagonalOperator<T: Scalar> {
    diag: Vec<T>,
}

impl<T: Scalar> DiagonalOperator<T> {
    /// Operator multiplying elementwise by `diag`.
    pub fn new(diag: Vec<T>) -> Self {
        Self { diag }
    }

    /// The diagonal entries.
    pub fn diag(&self) -> &[T] {
        &self.diag
    }
}

impl<T: Scalar> LinearOperator<T> for DiagonalOperator<T> {
    fn shape(&self) -> Shape {
        Shape::resolved(self.diag.len(), self.diag.len())
    }

    fn is_complex(&self) -> bool {
        T::IS_COMPLEX
    }

    fn is_sweepable(&self) -> bool {
        true
    }

    fn apply(&self, x: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>> {
        check_input(self.shape(), x, mode)?;
        let mut out = x.clone();
        for (i, &d) in self.diag.iter().enumerate() {
            let factor = match mode {
                ApplyMode::Forward => d,
                ApplyMode::Adjoint => d.conj(),
            };
            for j in 0..ncols(x) {
                out[[i, j]] = factor * x[[i, j]];
            }
        }
        Ok(out)
    }

    fn direct_solve(&self, b: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>> {
        check_input(self.shape(), b, mode.flipped())?;
        let mut out = b.clone();
        for (i, &d) in self.diag.iter().enumerate() {
            let factor = match mode {
                ApplyMode::Forward => d,
                ApplyMode::Adjoint => d.conj(),
            };
            if factor.abs_sq() == 0.0 {
                return Err(OperatorError::invalid(format!(
                    "diagonal entry {i} is zero, direct solve is singular"
                )));
            }
            for j in 0..ncols(b) {
                out[[i, j]] = b[[i, j]] / factor;
            }
        }
        Ok(out)
    }
}

/// Unitary discrete Fourier transform of size `n`.
///
/// The kernel is the naive O(n^2) transform; the composition engine only
/// consumes the contract, so a fast kernel can be substituted without
/// touching anything else. With the 1/sqrt(n) normalization the adjoint is
/// the inverse, which makes the operator sweepable.
pub struct DftOperator {
    shape: Shape,
}

impl DftOperator {
    /// DFT of a known size.
    pub fn new(n: usize) -> Self {
        Self {
            shape: Shape::resolved(n, n),
        }
    }

    /// DFT whose size is bound later via `activate`.
    pub fn deferred() -> Self {
        Self {
            shape: Shape::Unresolved,
        }
    }

    fn transform(&self, x: &Matrix<Complex64>, sign: f64) -> Matrix<Complex64> {
        let n = nrows(x);
        let scale = 1.0 / (n as f64).sqrt();
        let mut out = zeros::<Complex64>(n, ncols(x));
        for k in 0..n {
            for j in 0..n {
                let angle = sign * 2.0 * PI * (j as f64) * (k as f64) / (n as f64);
                let w = Complex64::new(angle.cos(), angle.sin()) * scale;
                for c in 0..ncols(x) {
                    out[[k, c]] += w * x[[j, c]];
                }
            }
        }
        out
    }
}

impl LinearOperator<Complex64> for DftOperator {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn is_complex(&self) -> bool {
        true
    }

    fn is_sweepable(&self) -> bool {
        true
    }

    fn apply(&self, x: &Matrix<Complex64>, mode: ApplyMode) -> Result<Matrix<Complex64>> {
        check_input(self.shape, x, mode)?;
        Ok(match mode {
            ApplyMode::Forward => self.transform(x, -1.0),
            ApplyMode::Adjoint => self.transform(x, 1.0),
        })
    }

    fn direct_solve(&self, b: &Matrix<Complex64>, mode: ApplyMode) -> Result<Matrix<Complex64>> {
        check_input(self.shape, b, mode.flipped())?;
        // Unitary, so the inverse of the forward map is the adjoint and
        // vice versa.
        Ok(match mode {
            ApplyMode::Forward => self.transform(b, 1.0),
            ApplyMode::Adjoint => self.transform(b, -1.0),
        })
    }

    fn activate(&mut self, cols: usize) -> Result<()> {
        if !self.shape.is_resolved() {
            self.shape = Shape::resolved(cols, cols);
        }
        Ok(())
    }
}
