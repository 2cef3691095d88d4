//! Variable pruning.
//!
//! Every (worker, empty shift) pair gets a [`VarSlot`]: a real binary
//! variable, or [`VarSlot::FixedZero`] when the worker can never take the
//! shift. Downstream formulas handle both cases through the same calls.

use tracing::debug;

use crate::mip::{LinearExpr, MipModel, VarId, VarRole};
use crate::models::{Shift, Worker};

/// An assignment decision: a model variable or the constant zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarSlot {
    Var(VarId),
    FixedZero,
}

impl VarSlot {
    #[inline]
    pub fn var(self) -> Option<VarId> {
        match self {
            VarSlot::Var(v) => Some(v),
            VarSlot::FixedZero => None,
        }
    }

    /// Adds `coef · slot` to `expr`; a fixed zero contributes nothing.
    #[inline]
    pub fn add_to(self, expr: &mut LinearExpr, coef: f64) {
        match self {
            VarSlot::Var(v) => expr.add_term(v, coef),
            VarSlot::FixedZero => {}
        }
    }

    /// Value under a solution (`0.0` for a fixed zero).
    #[inline]
    pub fn value(self, values: &[f64]) -> f64 {
        match self {
            VarSlot::Var(v) => values[v.index()],
            VarSlot::FixedZero => 0.0,
        }
    }
}

/// Assignment slots, one row per worker and one column per empty shift.
#[derive(Debug, Clone)]
pub struct AssignmentGrid {
    rows: Vec<Vec<VarSlot>>,
    pruned: usize,
}

impl AssignmentGrid {
    /// Creates the assignment variables in `model`.
    ///
    /// With `prune` set, pairs where the shift's slot is in the worker's
    /// forbidden set become [`VarSlot::FixedZero`].
    pub fn build(model: &mut MipModel, workers: &[Worker], empty: &[&Shift], prune: bool) -> Self {
        let mut pruned = 0;
        let rows = workers
            .iter()
            .enumerate()
            .map(|(w, worker)| {
                empty
                    .iter()
                    .enumerate()
                    .map(|(s, shift)| {
                        if prune && !worker.can_work(shift) {
                            pruned += 1;
                            VarSlot::FixedZero
                        } else {
                            VarSlot::Var(model.add_binary(
                                format!("x_{w}_{s}"),
                                VarRole::Assign { worker: w, shift: s },
                            ))
                        }
                    })
                    .collect()
            })
            .collect();

        let grid = Self { rows, pruned };
        debug!(
            variables = grid.variable_count(),
            pruned = grid.pruned,
            "assignment grid built"
        );
        grid
    }

    #[inline]
    pub fn slot(&self, worker: usize, shift: usize) -> VarSlot {
        self.rows[worker][shift]
    }

    #[inline]
    pub fn row(&self, worker: usize) -> &[VarSlot] {
        &self.rows[worker]
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.rows.len()
    }

    /// Pairs represented as constant zero.
    #[inline]
    pub fn pruned_count(&self) -> usize {
        self.pruned
    }

    /// Pairs carrying a real variable.
    pub fn variable_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|s| matches!(s, VarSlot::Var(_)))
            .count()
    }
}
