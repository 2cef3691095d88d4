//! Immutable input for one engine run.

use serde::{Deserialize, Serialize};

use super::{Shift, Worker};

/// The shifts and workers of one scheduling run.
///
/// Built once by the caller, read (never mutated) by the engine, and
/// discarded afterwards. Shifts that already carry an `assigned_worker`
/// are fixed history; only the empty ones are optimized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotaSnapshot {
    /// Number of days in the scheduled month.
    pub days_in_month: u32,
    /// Shift catalog.
    pub shifts: Vec<Shift>,
    /// Worker catalog.
    pub workers: Vec<Worker>,
}

impl RotaSnapshot {
    pub fn new(days_in_month: u32) -> Self {
        Self {
            days_in_month,
            shifts: Vec::new(),
            workers: Vec::new(),
        }
    }

    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shifts.push(shift);
        self
    }

    pub fn with_shifts(mut self, shifts: impl IntoIterator<Item = Shift>) -> Self {
        self.shifts.extend(shifts);
        self
    }

    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.workers.push(worker);
        self
    }

    /// Indices (into `shifts`) of shifts still without a worker.
    pub fn empty_shift_indices(&self) -> Vec<usize> {
        self.shifts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of a worker by name.
    pub fn worker_index(&self, name: &str) -> Option<usize> {
        self.workers.iter().position(|w| w.name == name)
    }
}
