//! Manual pre-assignment.
//!
//! Fixes chosen shifts to workers before the engine runs. The engine then
//! treats those shifts as history: they get no decision variable, but
//! they still block adjacent and same-day shifts for their worker.

use std::collections::BTreeMap;
use tracing::warn;

use crate::models::{Shift, ShiftId, Worker};

/// A request to fix one shift to one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAssignment {
    pub shift: ShiftId,
    pub worker: String,
}

impl ManualAssignment {
    pub fn new(shift: ShiftId, worker: impl Into<String>) -> Self {
        Self {
            shift,
            worker: worker.into(),
        }
    }
}

/// Why a manual request was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualRejection {
    /// No shift with that identity exists.
    UnknownShift,
    /// The shift is already held by the named worker.
    AlreadyAssigned(String),
}

/// Outcome of applying manual requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualReport {
    /// Shifts fixed per worker.
    pub applied: BTreeMap<String, u32>,
    /// Requests that were skipped.
    pub rejected: Vec<(ManualAssignment, ManualRejection)>,
}

impl ManualReport {
    /// Total number of shifts fixed.
    pub fn applied_count(&self) -> u32 {
        self.applied.values().sum()
    }

    /// Shrinks each worker's range by the shifts they received here,
    /// so the engine only fills the remainder.
    pub fn adjust_ranges(&self, workers: &mut [Worker]) {
        for worker in workers {
            if let Some(&taken) = self.applied.get(&worker.name) {
                worker.shift_range = worker.shift_range.reduced_by(taken);
            }
        }
    }
}

/// Applies manual requests in order. A shift that is already taken keeps
/// its first worker.
pub fn apply_manual_assignments(
    shifts: &mut [Shift],
    requests: &[ManualAssignment],
) -> ManualReport {
    let mut report = ManualReport::default();

    for request in requests {
        let Some(shift) = shifts.iter_mut().find(|s| s.id == request.shift) else {
            warn!(shift = %request.shift, "manual assignment for unknown shift");
            report
                .rejected
                .push((request.clone(), ManualRejection::UnknownShift));
            continue;
        };

        if let Some(holder) = &shift.assigned_worker {
            warn!(
                shift = %request.shift,
                holder = %holder,
                requested = %request.worker,
                "shift already assigned, skipping"
            );
            report.rejected.push((
                request.clone(),
                ManualRejection::AlreadyAssigned(holder.clone()),
            ));
            continue;
        }

        shift.assigned_worker = Some(request.worker.clone());
        *report.applied.entry(request.worker.clone()).or_default() += 1;
    }

    report
}
