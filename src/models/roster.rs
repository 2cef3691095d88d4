//! Roster (result) model.
//!
//! The final shift → worker mapping of a run together with its summary
//! statistics and terminal status.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{ShiftId, ShiftKind};

/// Terminal status of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Best roster proven within the time limit.
    Optimal,
    /// Time limit reached; best roster found so far, not proven optimal.
    NotSolved,
    /// No roster satisfies every hard rule.
    Infeasible,
    /// No empty shifts or no workers; the solver was not invoked.
    NothingToAssign,
    /// Any other solver outcome.
    Other(String),
}

impl SolveStatus {
    /// Whether the run produced solver assignments.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::NotSolved)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => f.write_str("Optimal"),
            SolveStatus::NotSolved => f.write_str("Not Solved"),
            SolveStatus::Infeasible => f.write_str("Infeasible"),
            SolveStatus::NothingToAssign => f.write_str("Nothing to assign"),
            SolveStatus::Other(s) => f.write_str(s),
        }
    }
}

/// Quality statistics computed from the final mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotaSummary {
    /// Assignments that land on one of the worker's preferred slots.
    pub preferences_count: usize,
    /// Assignments inside one of the worker's preferred units.
    pub preferred_unit_count: usize,
    /// Assignments outside the preferred units, counted only for workers
    /// that have unit preferences.
    pub non_preferred_unit_count: usize,
    /// Day+Night pairs in the same unit on the same day held by one worker.
    pub twenty_four_count: usize,
    /// Pairs of one worker's shifts on different days closer than the
    /// spacing threshold.
    pub spacing_violation_count: usize,
    /// Objective value reported by the solver, when it produced a roster.
    pub total_points: Option<f64>,
    /// Terminal status.
    pub status: SolveStatus,
}

impl RotaSummary {
    /// All-zero summary for runs without a roster.
    pub fn empty(status: SolveStatus) -> Self {
        Self {
            preferences_count: 0,
            preferred_unit_count: 0,
            non_preferred_unit_count: 0,
            twenty_four_count: 0,
            spacing_violation_count: 0,
            total_points: None,
            status,
        }
    }
}

/// Day/Night cover of one unit on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCover {
    /// `None` = no such shift; `Some(None)` = shift exists but is unassigned.
    pub day: Option<Option<String>>,
    pub night: Option<Option<String>>,
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotaOutcome {
    /// Every shift of the snapshot with its worker (`None` = unassigned).
    pub assignments: BTreeMap<ShiftId, Option<String>>,
    pub summary: RotaSummary,
}

impl RotaOutcome {
    #[inline]
    pub fn status(&self) -> &SolveStatus {
        &self.summary.status
    }

    /// Worker holding a shift, if any.
    pub fn worker_for(&self, shift: &ShiftId) -> Option<&str> {
        self.assignments.get(shift).and_then(|w| w.as_deref())
    }

    /// Shifts held by `worker`, in chronological order.
    pub fn shifts_of(&self, worker: &str) -> Vec<&ShiftId> {
        self.assignments
            .iter()
            .filter(|(_, w)| w.as_deref() == Some(worker))
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of shifts with a worker.
    pub fn assigned_count(&self) -> usize {
        self.assignments.values().filter(|w| w.is_some()).count()
    }

    /// Groups the mapping as unit → day → cover, for tabular display.
    pub fn by_unit(&self) -> BTreeMap<&str, BTreeMap<u32, DayCover>> {
        let mut units: BTreeMap<&str, BTreeMap<u32, DayCover>> = BTreeMap::new();
        for (id, worker) in &self.assignments {
            let cover = units
                .entry(id.unit.as_str())
                .or_default()
                .entry(id.day)
                .or_default();
            match id.kind {
                ShiftKind::Day => cover.day = Some(worker.clone()),
                ShiftKind::Night => cover.night = Some(worker.clone()),
            }
        }
        units
    }
}
