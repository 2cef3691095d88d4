//! Roster extraction and quality metrics.
//!
//! Reads solved assignment variables back into a shift → worker mapping,
//! then scores the mapping. Scoring looks only at the final mapping, so
//! pre-assigned and solver-assigned shifts count alike.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Preferences | Shifts on one of the holder's preferred slots |
//! | Preferred units | Shifts in one of the holder's preferred units |
//! | Non-preferred units | Shifts outside them (holders with unit preferences only) |
//! | 24-hour shifts | (worker, day, unit) with both Day and Night held |
//! | Spacing violations | Pairs of one worker's shifts `0 < gap < threshold` days apart |

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::builder::RotaModel;
use crate::models::{RotaSnapshot, RotaSummary, ShiftId, ShiftKind, SolveStatus, Worker};

/// Final mapping: every snapshot shift with its pre-assigned worker, plus
/// the solver's choices for empty shifts whose variable is set.
pub fn extract_assignments(
    snapshot: &RotaSnapshot,
    built: &RotaModel,
    values: &[f64],
) -> BTreeMap<ShiftId, Option<String>> {
    let mut assignments: BTreeMap<ShiftId, Option<String>> = snapshot
        .shifts
        .iter()
        .map(|s| (s.id.clone(), s.assigned_worker.clone()))
        .collect();

    for (w, worker) in snapshot.workers.iter().enumerate() {
        for (s, &shift_index) in built.empty.iter().enumerate() {
            if built.grid.slot(w, s).value(values) >= 0.5 {
                let id = &snapshot.shifts[shift_index].id;
                assignments.insert(id.clone(), Some(worker.name.clone()));
            }
        }
    }

    assignments
}

impl RotaSummary {
    /// Computes the summary of a final mapping.
    ///
    /// # Arguments
    /// * `assignments` - Final shift → worker mapping.
    /// * `workers` - Worker catalog (for preferences).
    /// * `spacing_threshold` - Minimum acceptable day gap.
    pub fn calculate(
        assignments: &BTreeMap<ShiftId, Option<String>>,
        workers: &[Worker],
        spacing_threshold: u32,
        status: SolveStatus,
        total_points: Option<f64>,
    ) -> Self {
        let by_name: HashMap<&str, &Worker> =
            workers.iter().map(|w| (w.name.as_str(), w)).collect();

        let mut preferences_count = 0;
        let mut preferred_unit_count = 0;
        let mut non_preferred_unit_count = 0;
        let mut held: BTreeMap<&str, Vec<&ShiftId>> = BTreeMap::new();

        for (id, holder) in assignments {
            let Some(name) = holder.as_deref() else {
                continue;
            };
            held.entry(name).or_default().push(id);

            let Some(worker) = by_name.get(name) else {
                continue;
            };
            if worker.preferred_shifts.contains(&id.slot()) {
                preferences_count += 1;
            }
            if !worker.preferred_units.is_empty() {
                if worker.prefers_unit(&id.unit) {
                    preferred_unit_count += 1;
                } else {
                    non_preferred_unit_count += 1;
                }
            }
        }

        let mut twenty_four_count = 0;
        let mut spacing_violation_count = 0;
        for shifts in held.values() {
            twenty_four_count += count_twenty_four(shifts);
            spacing_violation_count += count_spacing(shifts, spacing_threshold);
        }

        Self {
            preferences_count,
            preferred_unit_count,
            non_preferred_unit_count,
            twenty_four_count,
            spacing_violation_count,
            total_points,
            status,
        }
    }
}

fn count_twenty_four(shifts: &[&ShiftId]) -> usize {
    let nights: BTreeSet<(u32, &str)> = shifts
        .iter()
        .filter(|id| id.kind == ShiftKind::Night)
        .map(|id| (id.day, id.unit.as_str()))
        .collect();
    shifts
        .iter()
        .filter(|id| id.kind == ShiftKind::Day && nights.contains(&(id.day, id.unit.as_str())))
        .count()
}

fn count_spacing(shifts: &[&ShiftId], threshold: u32) -> usize {
    let mut days: Vec<u32> = shifts.iter().map(|id| id.day).collect();
    days.sort_unstable();

    let mut count = 0;
    for (i, &a) in days.iter().enumerate() {
        for &b in &days[i + 1..] {
            let gap = b - a;
            if gap >= threshold {
                break;
            }
            if gap > 0 {
                count += 1;
            }
        }
    }
    count
}
