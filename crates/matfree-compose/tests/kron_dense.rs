//! Exact numeric equivalence of the matrix-free Kron apply against the
//! explicit dense Kronecker product, for small factors.
//!
//! A wrong reshape in the factor sweep produces silently wrong numbers,
//! not a crash, so these tests are the safety net for the index
//! bookkeeping.

use matfree_compose::Kron;
use matfree_core::leaf::MatrixOperator;
use matfree_core::util::{from_vec2d, mat_mul, ncols, nrows, transpose_conj, zeros, Matrix};
use matfree_core::{ApplyMode, LinearOperator, Scalar};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn random_matrix<T: Scalar>(rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> Matrix<T> {
    let data: Vec<Vec<T>> = (0..rows)
        .map(|_| {
            (0..cols)
                .map(|_| {
                    T::from_parts(rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5)
                })
                .collect()
        })
        .collect();
    from_vec2d(data)
}

/// Explicit Kronecker product of two dense matrices.
fn dense_kron<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
    let (ra, ca) = (nrows(a), ncols(a));
    let (rb, cb) = (nrows(b), ncols(b));
    let mut out = zeros(ra * rb, ca * cb);
    for i1 in 0..ra {
        for j1 in 0..ca {
            for i2 in 0..rb {
                for j2 in 0..cb {
                    out[[i1 * rb + i2, j1 * cb + j2]] = a[[i1, j1]] * b[[i2, j2]];
                }
            }
        }
    }
    out
}

fn assert_close<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>, tol: f64) {
    assert_eq!(nrows(a), nrows(b));
    assert_eq!(ncols(a), ncols(b));
    for i in 0..nrows(a) {
        for j in 0..ncols(a) {
            assert!(
                (a[[i, j]] - b[[i, j]]).abs_val() < tol,
                "entry ({i}, {j}) differs"
            );
        }
    }
}

fn boxed<T: Scalar>(m: Matrix<T>) -> Box<dyn LinearOperator<T>> {
    Box::new(MatrixOperator::new(m))
}

fn check_against_dense<T: Scalar>(factors: Vec<Matrix<T>>, ncol: usize, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dense = factors
        .iter()
        .skip(1)
        .fold(factors[0].clone(), |acc, f| dense_kron(&acc, f));

    let kron = Kron::new(factors.into_iter().map(boxed).collect()).unwrap();
    assert_eq!(kron.shape().rows().unwrap(), nrows(&dense));
    assert_eq!(kron.shape().cols().unwrap(), ncols(&dense));

    let x = random_matrix::<T>(ncols(&dense), ncol, &mut rng);
    let y = kron.apply(&x, ApplyMode::Forward).unwrap();
    assert_close(&y, &mat_mul(&dense, &x), 1e-10);

    let u = random_matrix::<T>(nrows(&dense), ncol, &mut rng);
    let v = kron.apply(&u, ApplyMode::Adjoint).unwrap();
    assert_close(&v, &mat_mul(&transpose_conj(&dense), &u), 1e-10);
}

fn two_square_factors_generic<T: Scalar>() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let a = random_matrix::<T>(3, 3, &mut rng);
    let b = random_matrix::<T>(4, 4, &mut rng);
    check_against_dense(vec![a, b], 1, 11);
}

matfree_core::scalar_tests!(two_square_factors, two_square_factors_generic);

fn rectangular_factors_generic<T: Scalar>() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    // one shrinking, one expanding factor, so the cost ordering is
    // exercised in a non-trivial way
    let a = random_matrix::<T>(2, 5, &mut rng);
    let b = random_matrix::<T>(6, 3, &mut rng);
    check_against_dense(vec![a, b], 2, 12);
}

matfree_core::scalar_tests!(rectangular_factors, rectangular_factors_generic);

fn three_factors_batched_generic<T: Scalar>() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let a = random_matrix::<T>(2, 3, &mut rng);
    let b = random_matrix::<T>(5, 2, &mut rng);
    let c = random_matrix::<T>(3, 4, &mut rng);
    check_against_dense(vec![a, b, c], 4, 13);
}

matfree_core::scalar_tests!(three_factors_batched, three_factors_batched_generic);

/// The cost-ordering permutation must not change the numbers: applying
/// factors in the supplied order (dense reference) and in the optimized
/// order (Kron) agree exactly to tolerance.
#[test]
fn order_invariance() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    // shapes chosen so the optimized order is 1, 2, 0 rather than 0, 1, 2
    let a = random_matrix::<f64>(7, 2, &mut rng);
    let b = random_matrix::<f64>(2, 6, &mut rng);
    let c = random_matrix::<f64>(3, 3, &mut rng);

    let kron = Kron::new(vec![
        boxed(a.clone()),
        boxed(b.clone()),
        boxed(c.clone()),
    ])
    .unwrap();
    assert_eq!(kron.order().unwrap(), &[1, 2, 0][..]);

    let dense = dense_kron(&dense_kron(&a, &b), &c);
    let x = random_matrix::<f64>(ncols(&dense), 1, &mut rng);
    let y = kron.apply(&x, ApplyMode::Forward).unwrap();
    assert_close(&y, &mat_mul(&dense, &x), 1e-10);
}

/// Tensor products nest: Kron(Kron(a, b), c) equals Kron(a, b, c).
#[test]
fn nested_kron_matches_flat() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let a = random_matrix::<f64>(2, 2, &mut rng);
    let b = random_matrix::<f64>(3, 2, &mut rng);
    let c = random_matrix::<f64>(2, 4, &mut rng);

    let inner = Kron::new(vec![boxed(a.clone()), boxed(b.clone())]).unwrap();
    let nested = Kron::new(vec![Box::new(inner), boxed(c.clone())]).unwrap();
    let flat = Kron::new(vec![boxed(a), boxed(b), boxed(c)]).unwrap();

    let x = random_matrix::<f64>(flat.shape().cols().unwrap(), 2, &mut rng);
    let y_nested = nested.apply(&x, ApplyMode::Forward).unwrap();
    let y_flat = flat.apply(&x, ApplyMode::Forward).unwrap();
    assert_close(&y_nested, &y_flat, 1e-10);
}
