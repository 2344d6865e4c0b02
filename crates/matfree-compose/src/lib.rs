#![warn(missing_docs)]
//! Composition of matrix-free linear operators.
//!
//! Two composites are provided, both satisfying the
//! [`LinearOperator`](matfree_core::LinearOperator) contract so they nest
//! arbitrarily:
//! - [`Dictionary`]: horizontal concatenation `[w1*Op1, ..., wn*Opn]` with
//!   per-child scalar weights
//! - [`Kron`]: the Kronecker tensor product `Op1 ⊗ ... ⊗ OpN`, applied
//!   factor by factor in a cost-optimized order without ever forming the
//!   product matrix

pub mod dictionary;
pub mod kron;

pub use dictionary::Dictionary;
pub use kron::Kron;
