//! Iterative least-squares solver (LSQR).
//!
//! This is the fallback path of the solve dispatcher: it consumes an
//! operator purely through forward/adjoint apply callbacks, so it works
//! for any [`crate::LinearOperator`] including composites that cannot be
//! solved directly. The algorithm is LSQR (Paige & Saunders), based on
//! Golub-Kahan bidiagonalization; it minimizes `||A x - b||` and therefore
//! also handles over- and under-determined systems.

use crate::error::Result;
use crate::scalar::Scalar;

/// Options for the LSQR solver.
#[derive(Debug, Clone)]
pub struct LsqrOptions {
    /// Maximum number of iterations.
    /// Default: 200
    pub max_iter: usize,

    /// Convergence tolerance for the relative residual norm.
    /// The solver stops when `||A x - b|| / ||b|| < rtol`.
    /// Default: 1e-10
    pub rtol: f64,

    /// Whether to print convergence information.
    /// Default: false
    pub verbose: bool,
}

impl Default for LsqrOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            rtol: 1e-10,
            verbose: false,
        }
    }
}

/// Result of the LSQR solver.
#[derive(Debug, Clone)]
pub struct LsqrResult<T> {
    /// The solution vector.
    pub solution: Vec<T>,

    /// Number of iterations performed.
    pub iterations: usize,

    /// Final relative residual norm estimate.
    pub residual_norm: f64,

    /// Whether the solver converged within the iteration budget.
    pub converged: bool,
}

fn norm<T: Scalar>(v: &[T]) -> f64 {
    v.iter().map(|x| x.abs_sq()).sum::<f64>().sqrt()
}

fn scale_in_place<T: Scalar>(v: &mut [T], s: f64) {
    let s = T::from_f64(s);
    for x in v.iter_mut() {
        *x = s * *x;
    }
}

/// `v = w + s * v`
fn update_in_place<T: Scalar>(v: &mut [T], w: &[T], s: f64) {
    let s = T::from_f64(s);
    for (x, &y) in v.iter_mut().zip(w) {
        *x = y + s * *x;
    }
}

/// `x += s * w`
fn axpy_in_place<T: Scalar>(x: &mut [T], w: &[T], s: f64) {
    let s = T::from_f64(s);
    for (xi, &wi) in x.iter_mut().zip(w) {
        *xi = *xi + s * wi;
    }
}

/// Solve `min_x ||A x - b||` using LSQR.
///
/// # Type Parameters
///
/// * `T` - Scalar type of the system
/// * `F` - Forward apply: `F(v) = A v`
/// * `G` - Adjoint apply: `G(u) = A^H u`
///
/// # Arguments
///
/// * `apply_fwd` - Applies the system operator
/// * `apply_adj` - Applies its conjugate transpose
/// * `b` - Right-hand side vector
/// * `ncols` - Length of the solution vector (column count of `A`)
/// * `options` - Solver options
///
/// # Errors
///
/// Only errors raised by the apply callbacks are returned; they propagate
/// unchanged.
pub fn lsqr<T, F, G>(
    apply_fwd: F,
    apply_adj: G,
    b: &[T],
    ncols: usize,
    options: &LsqrOptions,
) -> Result<LsqrResult<T>>
where
    T: Scalar,
    F: Fn(&[T]) -> Result<Vec<T>>,
    G: Fn(&[T]) -> Result<Vec<T>>,
{
    let b_norm = norm(b);
    if b_norm < 1e-15 {
        // b is effectively zero, the least-squares solution is zero
        return Ok(LsqrResult {
            solution: vec![T::zero(); ncols],
            iterations: 0,
            residual_norm: 0.0,
            converged: true,
        });
    }

    // Golub-Kahan bidiagonalization: u spans the range side, v the domain
    // side. All rotation scalars are real even for complex T.
    let mut u = b.to_vec();
    let mut beta = b_norm;
    scale_in_place(&mut u, 1.0 / beta);

    let mut v = apply_adj(&u)?;
    let mut alpha = norm(&v);
    if alpha > 0.0 {
        scale_in_place(&mut v, 1.0 / alpha);
    }

    let mut w = v.clone();
    let mut x = vec![T::zero(); ncols];

    let mut phibar = beta;
    let mut rhobar = alpha;
    let mut iterations = 0;

    for iter in 0..options.max_iter {
        iterations = iter + 1;

        // u = A v - alpha u
        let av = apply_fwd(&v)?;
        update_in_place(&mut u, &av, -alpha);
        beta = norm(&u);
        if beta > 0.0 {
            scale_in_place(&mut u, 1.0 / beta);
        }

        // v = A^H u - beta v
        let atu = apply_adj(&u)?;
        update_in_place(&mut v, &atu, -beta);
        alpha = norm(&v);
        if alpha > 0.0 {
            scale_in_place(&mut v, 1.0 / alpha);
        }

        // Givens rotation eliminating beta from the bidiagonal system
        let rho = (rhobar * rhobar + beta * beta).sqrt();
        let c = rhobar / rho;
        let s = beta / rho;
        let theta = s * alpha;
        rhobar = -c * alpha;
        let phi = c * phibar;
        phibar *= s;

        // x += (phi / rho) w;  w = v - (theta / rho) w
        axpy_in_place(&mut x, &w, phi / rho);
        update_in_place(&mut w, &v, -theta / rho);

        let rel_res = phibar / b_norm;
        if options.verbose {
            eprintln!("LSQR iter {}: residual = {:.6e}", iterations, rel_res);
        }

        if rel_res < options.rtol {
            return Ok(LsqrResult {
                solution: x,
                iterations,
                residual_norm: rel_res,
                converged: true,
            });
        }

        // Exact breakdown: the Krylov space is exhausted, the current x
        // is the least-squares solution.
        if alpha == 0.0 || beta == 0.0 {
            break;
        }
    }

    let rel_res = phibar / b_norm;
    Ok(LsqrResult {
        solution: x,
        iterations,
        residual_norm: rel_res,
        converged: rel_res < options.rtol,
    })
}
