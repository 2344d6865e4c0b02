#![warn(missing_docs)]
//! Core contract for matrix-free linear operators.
//!
//! An operator is represented by its action on vectors rather than by an
//! explicit matrix. This crate provides:
//! - [`LinearOperator`]: the abstract operator contract (shape, capability
//!   flags, forward/adjoint apply, optional direct solve)
//! - Leaf operators: dense-matrix lift, identity, diagonal scaling, and a
//!   unitary DFT
//! - [`lsqr`](crate::lsqr::lsqr): an iterative least-squares solver that
//!   consumes only the apply contract
//! - [`solve`](crate::solve::solve): the dispatcher between direct
//!   (structured) and iterative solving
//!
//! Composition of operators (concatenation, Kronecker products) lives in
//! `matfree-compose`.

pub mod error;
pub mod leaf;
pub mod lsqr;
pub mod operator;
pub mod scalar;
pub mod solve;
pub mod util;

pub use error::{OperatorError, Result};
pub use leaf::{DftOperator, DiagonalOperator, IdentityOperator, MatrixOperator};
pub use lsqr::{lsqr, LsqrOptions, LsqrResult};
pub use operator::{ApplyMode, LinearOperator, Shape};
pub use scalar::Scalar;
pub use solve::{solve, solve_with};
pub use util::{from_vec2d, ncols, nrows, zeros, Matrix};
