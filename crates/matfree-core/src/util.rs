//! Matrix type and small helpers shared across the workspace.
//!
//! Vectors handed to operators are always packed as the columns of a
//! [`Matrix`], so a single apply call covers the batched case.

use mdarray::DTensor;

use crate::scalar::Scalar;

/// Dense 2-D matrix backed by mdarray.
pub type Matrix<T> = DTensor<T, 2>;

/// Number of rows of a matrix.
pub fn nrows<T>(m: &Matrix<T>) -> usize {
    m.dim(0)
}

/// Number of columns of a matrix.
pub fn ncols<T>(m: &Matrix<T>) -> usize {
    m.dim(1)
}

/// Create a zero-filled matrix.
pub fn zeros<T: Scalar>(rows: usize, cols: usize) -> Matrix<T> {
    Matrix::from_elem([rows, cols], T::zero())
}

/// Build a matrix from rows given as nested vectors.
///
/// Panics if the rows have inconsistent lengths.
pub fn from_vec2d<T: Scalar>(rows: Vec<Vec<T>>) -> Matrix<T> {
    let nr = rows.len();
    let nc = if nr == 0 { 0 } else { rows[0].len() };
    for r in &rows {
        assert_eq!(r.len(), nc, "from_vec2d: ragged rows");
    }
    Matrix::from_fn([nr, nc], |idx| rows[idx[0]][idx[1]])
}

/// Build a single-column matrix from a slice.
pub fn column_matrix<T: Scalar>(v: &[T]) -> Matrix<T> {
    Matrix::from_fn([v.len(), 1], |idx| v[idx[0]])
}

/// Extract column `j` as a vector.
pub fn column<T: Scalar>(m: &Matrix<T>, j: usize) -> Vec<T> {
    (0..nrows(m)).map(|i| m[[i, j]]).collect()
}

/// Overwrite column `j` with the given values.
pub fn set_column<T: Scalar>(m: &mut Matrix<T>, j: usize, v: &[T]) {
    assert_eq!(v.len(), nrows(m));
    for (i, &x) in v.iter().enumerate() {
        m[[i, j]] = x;
    }
}

/// Plain dense matrix product `a * b`.
pub fn mat_mul<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
    let (n, k) = (nrows(a), ncols(a));
    let m = ncols(b);
    assert_eq!(k, nrows(b), "mat_mul: inner dimensions differ");
    let mut out = zeros(n, m);
    for i in 0..n {
        for l in 0..k {
            let ail = a[[i, l]];
            for j in 0..m {
                out[[i, j]] = out[[i, j]] + ail * b[[l, j]];
            }
        }
    }
    out
}

/// Product `a^H * b` without materializing the conjugate transpose.
pub fn adjoint_mat_mul<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
    let (k, n) = (nrows(a), ncols(a));
    let m = ncols(b);
    assert_eq!(k, nrows(b), "adjoint_mat_mul: inner dimensions differ");
    let mut out = zeros(n, m);
    for l in 0..k {
        for i in 0..n {
            let ali = a[[l, i]].conj();
            for j in 0..m {
                out[[i, j]] = out[[i, j]] + ali * b[[l, j]];
            }
        }
    }
    out
}

/// Conjugate transpose of a matrix.
pub fn transpose_conj<T: Scalar>(m: &Matrix<T>) -> Matrix<T> {
    Matrix::from_fn([ncols(m), nrows(m)], |idx| m[[idx[1], idx[0]]].conj())
}
