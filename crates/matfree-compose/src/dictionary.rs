//! Horizontal concatenation of operators ("dictionary").
//!
//! A dictionary stacks operators side by side: `[w1*Op1, ..., wn*Opn]`.
//! All children must agree on the row count; the column space is the
//! concatenation of the children's column spaces, so a forward apply
//! splits the input into per-child blocks and sums the weighted child
//! outputs, and an adjoint apply scatters each child's adjoint result
//! into its own disjoint block.

use matfree_core::error::{OperatorError, Result};
use matfree_core::operator::{check_input, ApplyMode, LinearOperator, Shape};
use matfree_core::scalar::Scalar;
use matfree_core::util::{ncols, zeros, Matrix};

/// Horizontal concatenation of child operators with per-child weights.
pub struct Dictionary<T: Scalar> {
    ops: Vec<Box<dyn LinearOperator<T>>>,
    weights: Vec<T>,
    shape: Shape,
}

impl<T: Scalar> Dictionary<T> {
    /// Concatenate operators with unit weights.
    pub fn new(ops: Vec<Box<dyn LinearOperator<T>>>) -> Result<Self> {
        let weights = vec![T::one(); ops.len()];
        Self::with_weights(weights, ops)
    }

    /// Concatenate operators, scaling child `i`'s contribution by
    /// `weights[i]` (conjugated in adjoint mode).
    ///
    /// # Errors
    ///
    /// - [`OperatorError::InvalidOperator`] if no children are given, the
    ///   weight count does not match, or every child has zero columns
    /// - [`OperatorError::InconsistentShape`] if a child's row count
    ///   disagrees with the preceding children; `index` is the 1-based
    ///   position of the offending child
    pub fn with_weights(weights: Vec<T>, ops: Vec<Box<dyn LinearOperator<T>>>) -> Result<Self> {
        if ops.is_empty() {
            return Err(OperatorError::invalid(
                "dictionary requires at least one operator",
            ));
        }
        if weights.len() != ops.len() {
            return Err(OperatorError::invalid(format!(
                "got {} weights for {} operators",
                weights.len(),
                ops.len()
            )));
        }

        // Row counts must agree across all children whose shape is known.
        let mut rows: Option<usize> = None;
        for (i, op) in ops.iter().enumerate() {
            if let Shape::Resolved { rows: r, .. } = op.shape() {
                match rows {
                    None => rows = Some(r),
                    Some(expected) if r != expected => {
                        return Err(OperatorError::InconsistentShape {
                            index: i + 1,
                            expected,
                            got: r,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        // Zero-column children contribute nothing to either apply
        // direction; drop them (with their weights) before the offset
        // bookkeeping.
        let mut kept_ops = Vec::with_capacity(ops.len());
        let mut kept_weights = Vec::with_capacity(ops.len());
        for (op, w) in ops.into_iter().zip(weights) {
            if matches!(op.shape(), Shape::Resolved { cols: 0, .. }) {
                continue;
            }
            kept_ops.push(op);
            kept_weights.push(w);
        }
        if kept_ops.is_empty() {
            return Err(OperatorError::invalid(
                "every operator in the dictionary has zero columns",
            ));
        }

        let mut dict = Self {
            ops: kept_ops,
            weights: kept_weights,
            shape: Shape::Unresolved,
        };
        dict.refresh()?;
        Ok(dict)
    }

    /// The child operators (zero-column children already dropped).
    pub fn operators(&self) -> &[Box<dyn LinearOperator<T>>] {
        &self.ops
    }

    /// The per-child weights, aligned with [`Dictionary::operators`].
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Recompute shape from the children; stays unresolved while any
    /// child is. Re-validates row agreement, since activation may have
    /// bound a child to a conflicting size.
    fn refresh(&mut self) -> Result<()> {
        if self.shape.is_resolved() {
            return Ok(());
        }
        let mut cols = 0usize;
        let mut rows: Option<usize> = None;
        for (i, op) in self.ops.iter().enumerate() {
            match op.shape() {
                Shape::Resolved { rows: r, cols: c } => {
                    match rows {
                        None => rows = Some(r),
                        Some(expected) if r != expected => {
                            return Err(OperatorError::InconsistentShape {
                                index: i + 1,
                                expected,
                                got: r,
                            });
                        }
                        Some(_) => {}
                    }
                    cols += c;
                }
                Shape::Unresolved => return Ok(()),
            }
        }
        if let Some(rows) = rows {
            self.shape = Shape::resolved(rows, cols);
        }
        Ok(())
    }
}

impl<T: Scalar> LinearOperator<T> for Dictionary<T> {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn is_complex(&self) -> bool {
        self.ops.iter().any(|op| op.is_complex())
    }

    fn is_linear(&self) -> bool {
        self.ops.iter().all(|op| op.is_linear())
    }

    fn apply(&self, x: &Matrix<T>, mode: ApplyMode) -> Result<Matrix<T>> {
        check_input(self.shape, x, mode)?;
        let nc = ncols(x);
        match mode {
            ApplyMode::Forward => {
                let rows = self.shape.rows()?;
                let mut out = zeros(rows, nc);
                let mut offset = 0usize;
                for (op, &w) in self.ops.iter().zip(&self.weights) {
                    let c = op.shape().cols()?;
                    let block = Matrix::from_fn([c, nc], |idx| x[[offset + idx[0], idx[1]]]);
                    let y = op.apply(&block, mode)?;
                    for i in 0..rows {
                        for j in 0..nc {
                            out[[i, j]] = out[[i, j]] + w * y[[i, j]];
                        }
                    }
                    offset += c;
                }
                Ok(out)
            }
            ApplyMode::Adjoint => {
                let cols = self.shape.cols()?;
                let mut out = zeros(cols, nc);
                let mut offset = 0usize;
                for (op, &w) in self.ops.iter().zip(&self.weights) {
                    let c = op.shape().cols()?;
                    let y = op.apply(x, mode)?;
                    let wc = w.conj();
                    for i in 0..c {
                        for j in 0..nc {
                            out[[offset + i, j]] = wc * y[[i, j]];
                        }
                    }
                    offset += c;
                }
                Ok(out)
            }
        }
    }

    fn activate(&mut self, cols: usize) -> Result<()> {
        if self.shape.is_resolved() {
            return Ok(());
        }
        // The hint is the composite column count; it determines at most
        // one unbound child, by subtracting the resolved ones.
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
                    .sum();
                let remaining = cols.checked_sub(known).ok_or_else(|| {
                    OperatorError::invalid(format!(
                        "cannot activate dictionary: resolved children already span {known} columns, hint is {cols}"
                    ))
                })?;
                self.ops[*k].activate(remaining)?;
            }
            _ => return Err(OperatorError::UnresolvedShape),
        }
        self.refresh()?;
        // A child may still have declined to resolve.
        if !self.shape.is_resolved() {
            return Err(OperatorError::UnresolvedShape);
        }
        Ok(())
    }
}
