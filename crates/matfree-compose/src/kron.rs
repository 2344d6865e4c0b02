//! Kronecker tensor-product operator.
//!
//! `Kron` represents `Op1 ⊗ Op2 ⊗ ... ⊗ OpN` without forming the product
//! matrix: the working batch is viewed as a tensor with one axis per
//! factor, and each factor is applied to its own axis as `I(a) ⊗ F ⊗ I(b)`.
//! The factor order is chosen from a fixed cost model so the shrinking
//! factors go first, keeping intermediate buffers small; the results are
//! numerically identical for any order.
//!
//! Conventions follow the canonical Kronecker definition: in `A ⊗ B`, `B`
//! acts on the fastest-varying index, i.e. the flat input index is
//! `i1 * c2 + i2` for factor input sizes `(c1, c2)`.

use matfree_core::error::{OperatorError, Result};
use matfree_core::operator::{check_input, ApplyMode, LinearOperator, Shape};
use matfree_core::scalar::Scalar;
use matfree_core::util::{ncols, Matrix};

/// Kronecker tensor product of child operators.
pub struct Kron<T: Scalar> {
    ops: Vec<Box<dyn LinearOperator<T>>>,
    shape: Shape,
    /// Factor application order, frozen once the shape resolves.
    order: Option<Vec<usize>>,
}

/// Per-factor application cost: `(r - c) / (r * c)`.
///
/// Ascending order applies the operators that most shrink (or least
/// expand) the working buffer first. This is a compatibility heuristic,
/// not a proven optimum; changing it changes behavior and needs explicit
/// sign-off.
fn factor_cost(rows: usize, cols: usize) -> f64 {
    let (r, c) = (rows as f64, cols as f64);
    (r - c) / (r * c)
}

/// Sort factor indices ascending by cost, ties broken by original index
/// (stable sort).
fn application_order(shapes: &[(usize, usize)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..shapes.len()).collect();
    order.sort_by(|&i, &j| {
        let (ci, cj) = (
            factor_cost(shapes[i].0, shapes[i].1),
            factor_cost(shapes[j].0, shapes[j].1),
        );
        // total_cmp keeps the index tie-break deterministic even when a
        // zero-dimension factor yields a NaN cost
        ci.total_cmp(&cj)
    });
    order
}

impl<T: Scalar> Kron<T> {
    /// Build the tensor product of the given operators, ordered as
    /// supplied.
    ///
    /// # Errors
    ///
    /// [`OperatorError::InvalidOperator`] if fewer than two operators are
    /// given. If any child's shape is unresolved the composite stays
    /// unresolved and the application order is deferred to activation.
    pub fn new(ops: Vec<Box<dyn LinearOperator<T>>>) -> Result<Self> {
        if ops.len() < 2 {
            return Err(OperatorError::invalid(format!(
                "tensor product requires at least two operators, got {}",
                ops.len()
            )));
        }
        let mut kron = Self {
            ops,
            shape: Shape::Unresolved,
            order: None,
        };
        kron.refresh();
        Ok(kron)
    }

    /// The child operators, in the order supplied.
    pub fn operators(&self) -> &[Box<dyn LinearOperator<T>>] {
        &self.ops
    }

    /// The cached factor application order, once resolved.
    pub fn order(&self) -> Option<&[usize]> {
        self.order.as_deref()
    }

    /// Compute shape and application order once every child is resolved.
    fn refresh(&mut self) {
        if self.shape.is_resolved() {
            return;
        }
        let mut shapes = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            match op.shape() {
                Shape::Resolved { rows, cols } => shapes.push((rows, cols)),
                Shape::Unresolved => return,
            }
        }
        let rows = shapes.iter().map(|&(r, _)| r).product();
        let cols = shapes.iter().map(|&(_, c)| c).product();
        self.order = Some(application_order(&shapes));
        self.shape = Shape::resolved(rows, cols);
    }

    /// Per-factor (input, output) extents for the given mode, plus the
    /// factor sequence. `solve` flips the extents: solving consumes
    /// `rows`-sized data and produces `cols`-sized data in forward mode.
    fn sweep_plan(&self, mode: ApplyMode, solving: bool) -> Result<(Vec<usize>, Vec<usize>, Vec<usize>)> {
        let order = self.order.as_ref().ok_or(OperatorError::UnresolvedShape)?;
        let mut ins = Vec::with_capacity(self.ops.len());
        let mut outs = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            let shape = op.shape();
            let (i, o) = if solving {
                (shape.output_len(mode)?, shape.input_len(mode)?)
            } else {
                (shape.input_len(mode)?, shape.output_len(mode)?)
            };
            ins.push(i);
            outs.push(o);
        }
        // Transposition reverses the effective factor sequence, so the
        // adjoint sweep (and the forward solve, which is shaped like one)
        // walks the cached order backwards.
        let reversed = match (mode, solving) {
            (ApplyMode::Adjoint, false) | (ApplyMode::Forward, true) => true,
            _ => false,
        };
        let seq: Vec<usize> = if reversed {
            order.iter().rev().copied().collect()
        } else {
            order.clone()
        };
        Ok((ins, outs, seq))
    }

    /// Apply every factor to its own tensor axis, in `seq` order.
    ///
    /// The working buffer holds the batch as a row-major tensor
    /// `(ncol, d_1, ..., d_N)`; applying factor `k` views it as
    /// `(a, d_k, b)` with `a = ncol * prod(d_j, j < k)` and
    /// `b = prod(d_j, j > k)`, gathers the `d_k`-fibers into the columns
    /// of a matrix, runs one batched child call, and scatters the result
    /// back with `d_k` grown/shrunk to the factor's output extent.
    fn factor_sweep(
        &self,
        x: &Matrix<T>,
        mode: ApplyMode,
        solving: bool,
    ) -> Result<Matrix<T>> {
        let (ins, outs, seq) = self.sweep_plan(mode, solving)?;
        let nc = ncols(x);
        let mut dims = ins.clone();

        let in_total: usize = ins.iter().product();
        let mut buf: Vec<T> = Vec::with_capacity(nc * in_total);
        for col in 0..nc {
            for row in 0..in_total {
                buf.push(x[[row, col]]);
            }
        }

        for &k in &seq {
            let c = dims[k];
            let r = outs[k];
            let a: usize = nc * dims[..k].iter().product::<usize>();
            let b: usize = dims[k + 1..].iter().product();

            // gather the c-axis fibers: fiber (ia, ib) becomes column
            // ia * b + ib
            let gathered =
                Matrix::from_fn([c, a * b], |idx| {
                    let (ic, col) = (idx[0], idx[1]);
                    let (ia, ib) = (col / b, col % b);
                    buf[(ia * c + ic) * b + ib]
                });

            let child = &self.ops[k];
            let applied = if solving {
                child.direct_solve(&gathered, mode)?
            } else {
                child.apply(&gathered, mode)?
            };

            // scatter back with the axis at its new extent
            let mut next = vec![T::zero(); a * r * b];
            for ia in 0..a {
                for ir in 0..r {
                    for ib in 0..b {
                        next[(ia * r + ir) * b + ib] = applied[[ir, ia * b + ib]];
                    }
                }
            }
            buf = next;
            dims[k] = r;
        }

        let out_total: usize = outs.iter().product();
        Ok(Matrix::from_fn([out_total, nc], |idx| {
            buf[idx[1] * out_total + idx[0]]
        }))
    }
}

impl<T: Scalar> LinearOperator<T> for Kron<T> {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn is_complex(&self) -> bool {
        self.ops.iter().any(|op| op.is_complex())
    }

    fn is_linear(&self) -> bool {
        self.ops.iter().all(|op| op.is_linear())
    }

    fn is_sweepable(&self) -> bool {
        self.ops.iter().all(|op| op.is_sweepable())
    }

    fn apply(&self, x: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>> {
        check_input(self.shape, x, mode)?;
        self.factor_sweep(x, mode, false)
    }

    fn direct_solve(&self, b: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>> {
        if !self.is_sweepable() {
            return Err(OperatorError::invalid(
                "tensor product is only directly solvable when every factor is",
            ));
        }
        check_input(self.shape, b, mode.flipped())?;
        self.factor_sweep(b, mode, true)
    }

    fn activate(&mut self, cols: usize) -> Result<()> {
        if self.shape.is_resolved() {
            return Ok(());
        }
        let unresolved: Vec<usize> = self
            .ops
            .iter()
            .enumerate()
            .filter(|(_, op)| !op.shape().is_resolved())
            .map(|(i, _)| i)
            .collect();
        match unresolved.as_slice() {
            [] => {}
            [k] => {
                let known: usize = self
                    .ops
                    .iter()
                    .filter_map(|op| op.shape().cols().ok())
                    .product();
                if known == 0 || cols % known != 0 {
                    return Err(OperatorError::invalid(format!(
                        "cannot activate tensor product: {cols} columns do not factor over the resolved children ({known})"
                    )));
                }
                self.ops[*k].activate(cols / known)?;
            }
            _ => return Err(OperatorError::UnresolvedShape),
        }
        self.refresh();
        if !self.shape.is_resolved() {
            return Err(OperatorError::UnresolvedShape);
        }
        Ok(())
    }
}
