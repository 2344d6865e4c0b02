//! Common scalar trait for operator algebra.
//!
//! Operators are generic over a scalar type that covers both real and
//! complex arithmetic; the adjoint algebra only needs conjugation and a
//! handful of conversions on top of the ring operations.

use num_complex::{Complex32, Complex64};
use num_traits::{Float, One, Zero};

/// Scalar element of the vectors an operator acts on.
///
/// Implemented for `f32`, `f64`, `Complex32`, and `Complex64`.
pub trait Scalar:
    Clone
    + Copy
    + Zero
    + One
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + std::ops::Neg<Output = Self>
    + std::fmt::Debug
    + Default
    + Send
    + Sync
    + 'static
{
    /// Whether the type carries an imaginary component.
    ///
    /// Matrix-lifted leaf operators report this as their `is_complex`
    /// capability flag.
    const IS_COMPLEX: bool;

    /// Complex conjugate of the value.
    fn conj(self) -> Self;

    /// Square of the absolute value (for complex numbers, |z|^2).
    fn abs_sq(self) -> f64;

    /// Absolute value as f64.
    fn abs_val(self) -> f64 {
        self.abs_sq().sqrt()
    }

    /// Create from an f64 value.
    fn from_f64(val: f64) -> Self;

    /// Create from real and imaginary parts.
    ///
    /// Real types drop the imaginary part; only intended for generating
    /// generic test data and weights.
    fn from_parts(re: f64, im: f64) -> Self;
}

impl Scalar for f64 {
    const IS_COMPLEX: bool = false;

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs_sq(self) -> f64 {
        self * self
    }

    #[inline]
    fn abs_val(self) -> f64 {
        Float::abs(self)
    }

    #[inline]
    fn from_f64(val: f64) -> Self {
        val
    }

    #[inline]
    fn from_parts(re: f64, _im: f64) -> Self {
        re
    }
}

impl Scalar for f32 {
    const IS_COMPLEX: bool = false;

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs_sq(self) -> f64 {
        (self * self) as f64
    }

    #[inline]
    fn abs_val(self) -> f64 {
        Float::abs(self) as f64
    }

    #[inline]
    fn from_f64(val: f64) -> Self {
        val as f32
    }

    #[inline]
    fn from_parts(re: f64, _im: f64) -> Self {
        re as f32
    }
}

impl Scalar for Complex64 {
    const IS_COMPLEX: bool = true;

    #[inline]
    fn conj(self) -> Self {
        Complex64::conj(&self)
    }

    #[inline]
    fn abs_sq(self) -> f64 {
        self.norm_sqr()
    }

    #[inline]
    fn abs_val(self) -> f64 {
        self.norm()
    }

    #[inline]
    fn from_f64(val: f64) -> Self {
        Complex64::new(val, 0.0)
    }

    #[inline]
    fn from_parts(re: f64, im: f64) -> Self {
        Complex64::new(re, im)
    }
}

impl Scalar for Complex32 {
    const IS_COMPLEX: bool = true;

    #[inline]
    fn conj(self) -> Self {
        Complex32::conj(&self)
    }

    #[inline]
    fn abs_sq(self) -> f64 {
        self.norm_sqr() as f64
    }

    #[inline]
    fn abs_val(self) -> f64 {
        self.norm() as f64
    }

    #[inline]
    fn from_f64(val: f64) -> Self {
        Complex32::new(val as f32, 0.0)
    }

    #[inline]
    fn from_parts(re: f64, im: f64) -> Self {
        Complex32::new(re as f32, im as f32)
    }
}

/// Macro to generate f64 and Complex64 test variants from a generic test
/// function.
///
/// # Example
///
/// ```ignore
/// fn check_apply_generic<T: Scalar>() {
///     // test implementation
/// }
///
/// matfree_core::scalar_tests!(check_apply, check_apply_generic);
/// // Generates:
/// // #[test] fn check_apply_f64() { check_apply_generic::<f64>(); }
/// // #[test] fn check_apply_c64() { check_apply_generic::<Complex64>(); }
/// ```
#[macro_export]
macro_rules! scalar_tests {
    ($name:ident, $test_fn:ident) => {
        paste::paste! {
            #[test]
            fn [<$name _f64>]() {
                $test_fn::<f64>();
            }

            #[test]
            fn [<$name _c64>]() {
                $test_fn::<num_complex::Complex64>();
            }
        }
    };
}
