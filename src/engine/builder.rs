//! Model construction.
//!
//! Turns a snapshot into a binary [`MipModel`]:
//!
//! - `x[w][s]`: worker `w` takes empty shift `s` (pruned pairs are zero)
//! - `t[w][p]`: worker `w` takes both halves of 24-hour pair `p`
//! - `z[w][p]`: worker `w` takes both shifts of spacing pair `p`
//!
//! Auxiliaries use the AND-linearization `aux ≥ a + b − 1`, `aux ≤ a`,
//! `aux ≤ b` and exist only where both halves are real variables.
//!
//! Objective (maximize): filled shifts, preferred slots and preferred
//! units score positively; spacing pairs and 24-hour pairs carry their
//! (normally negative) weights.
//!
//! Pre-assigned shifts are not variables but still bind their worker:
//! adjacent and same-day empty shifts are zeroed, the complementary half
//! of a 24-hour pair counts against the worker's cap, and nearby shifts
//! pay the spacing penalty.
//!
//! # Reference
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::pairs::{AnchorLinks, ShiftPairs};
use super::pruning::{AssignmentGrid, VarSlot};
use crate::config::Settings;
use crate::mip::{ConstraintKind, LinearExpr, MipModel, Sense, VarRole};
use crate::models::{RotaSnapshot, Shift, ShiftKind, Worker};

/// A built model together with the lookup tables needed to read it back.
#[derive(Debug, Clone)]
pub struct RotaModel {
    pub model: MipModel,
    pub grid: AssignmentGrid,
    /// Indices (into the snapshot's shifts) of the empty shifts, in grid
    /// column order.
    pub empty: Vec<usize>,
    pub pairs: ShiftPairs,
}

/// Builds the optimization model for one snapshot.
pub struct RotaModelBuilder<'a> {
    snapshot: &'a RotaSnapshot,
    settings: &'a Settings,
}

impl<'a> RotaModelBuilder<'a> {
    pub fn new(snapshot: &'a RotaSnapshot, settings: &'a Settings) -> Self {
        Self { snapshot, settings }
    }

    pub fn build(&self) -> RotaModel {
        let snapshot = self.snapshot;
        let settings = self.settings;

        let empty = snapshot.empty_shift_indices();
        let empty_shifts: Vec<&Shift> = empty.iter().map(|&i| &snapshot.shifts[i]).collect();
        let pairs = ShiftPairs::generate(&empty_shifts, settings.spacing_days_threshold);
        debug!(
            night_to_day = pairs.night_to_day.len(),
            adjacent_nights = pairs.adjacent_nights.len(),
            adjacent_days = pairs.adjacent_days.len(),
            twenty_four = pairs.twenty_four.len(),
            same_day = pairs.same_day_conflicts.len(),
            spacing = pairs.spacing.len(),
            "pairs generated"
        );

        let mut model = MipModel::new("rota");
        let grid = AssignmentGrid::build(
            &mut model,
            &snapshot.workers,
            &empty_shifts,
            settings.prune_forbidden_pairs,
        );

        let anchors = self.anchors();
        let mut objective = LinearExpr::new();

        for (w, worker) in snapshot.workers.iter().enumerate() {
            let row = grid.row(w);
            let links: Vec<AnchorLinks> = anchors[w]
                .iter()
                .map(|s| AnchorLinks::generate(&s.id, &empty_shifts, settings.spacing_days_threshold))
                .collect();

            for (s, &slot) in row.iter().enumerate() {
                slot.add_to(&mut objective, assignment_points(worker, empty_shifts[s], settings));
            }

            // Shift count range.
            let mut count = LinearExpr::new();
            for &slot in row {
                slot.add_to(&mut count, 1.0);
            }
            model.add_constraint(
                ConstraintKind::WorkerMin,
                count.clone(),
                Sense::Ge,
                f64::from(worker.shift_range.min),
            );
            model.add_constraint(
                ConstraintKind::WorkerMax,
                count,
                Sense::Le,
                f64::from(worker.shift_range.max),
            );

            // Pairwise exclusions.
            for &(a, b) in &pairs.night_to_day {
                at_most_one(&mut model, ConstraintKind::NightToDay, row[a], row[b]);
            }
            if settings.enforce_no_adjacent_nights {
                for &(a, b) in &pairs.adjacent_nights {
                    at_most_one(&mut model, ConstraintKind::AdjacentNights, row[a], row[b]);
                }
            }
            if settings.enforce_no_adjacent_days {
                for &(a, b) in &pairs.adjacent_days {
                    at_most_one(&mut model, ConstraintKind::AdjacentDays, row[a], row[b]);
                }
            }
            for &(a, b) in &pairs.same_day_conflicts {
                at_most_one(&mut model, ConstraintKind::SameDay, row[a], row[b]);
            }

            // 24-hour pairs and cap, including halves completing a
            // pre-assigned shift.
            let mut twenty_four = LinearExpr::new();
            for (p, &(d, n)) in pairs.twenty_four.iter().enumerate() {
                let Some(t) = and_aux(
                    &mut model,
                    ConstraintKind::TwentyFourLink,
                    format!("t_{w}_{p}"),
                    VarRole::TwentyFour { worker: w, pair: p },
                    row[d],
                    row[n],
                ) else {
                    continue;
                };
                t.add_to(&mut objective, f64::from(settings.points_24hr));
                t.add_to(&mut twenty_four, 1.0);
            }
            for link in &links {
                if let Some(c) = link.complement {
                    row[c].add_to(&mut objective, f64::from(settings.points_24hr));
                    row[c].add_to(&mut twenty_four, 1.0);
                    if worker.max_24hr_count == 0 {
                        at_most_zero(&mut model, ConstraintKind::PreAssigned, row[c]);
                    }
                }
            }
            let fixed_pairs = fixed_twenty_four_pairs(&anchors[w]);
            model.add_constraint(
                ConstraintKind::TwentyFourCap,
                twenty_four,
                Sense::Le,
                f64::from(worker.max_24hr_count.saturating_sub(fixed_pairs)),
            );

            // Weekend cap, less the weekend shifts already fixed.
            let mut weekend = LinearExpr::new();
            for (s, &slot) in row.iter().enumerate() {
                if empty_shifts[s].is_weekend() {
                    slot.add_to(&mut weekend, 1.0);
                }
            }
            let fixed_weekends = anchors[w].iter().filter(|s| s.is_weekend()).count() as u32;
            model.add_constraint(
                ConstraintKind::WeekendCap,
                weekend,
                Sense::Le,
                f64::from(worker.max_weekend_count.saturating_sub(fixed_weekends)),
            );

            // Spacing penalty (soft).
            for (p, &(a, b)) in pairs.spacing.iter().enumerate() {
                if let Some(z) = and_aux(
                    &mut model,
                    ConstraintKind::SpacingLink,
                    format!("z_{w}_{p}"),
                    VarRole::Spacing { worker: w, pair: p },
                    row[a],
                    row[b],
                ) {
                    z.add_to(&mut objective, f64::from(settings.points_spacing));
                }
            }
            for link in &links {
                for &s in &link.spacing {
                    row[s].add_to(&mut objective, f64::from(settings.points_spacing));
                }
            }

            // Forbidden slots still carrying a variable.
            for (s, &slot) in row.iter().enumerate() {
                if !worker.can_work(empty_shifts[s]) {
                    at_most_zero(&mut model, ConstraintKind::Forbidden, slot);
                }
            }

            // Shifts that clash with a pre-assigned one.
            let mut blocked: BTreeSet<usize> = BTreeSet::new();
            for link in &links {
                blocked.extend(&link.night_to_day);
                blocked.extend(&link.same_day);
                if settings.enforce_no_adjacent_nights {
                    blocked.extend(&link.adjacent_nights);
                }
                if settings.enforce_no_adjacent_days {
                    blocked.extend(&link.adjacent_days);
                }
            }
            for s in blocked {
                at_most_zero(&mut model, ConstraintKind::PreAssigned, row[s]);
            }
        }

        // One worker per shift.
        for s in 0..empty.len() {
            let mut cover = LinearExpr::new();
            for w in 0..grid.worker_count() {
                grid.slot(w, s).add_to(&mut cover, 1.0);
            }
            model.add_constraint(ConstraintKind::ShiftCapacity, cover, Sense::Le, 1.0);
        }

        model.set_objective(objective);
        debug!(
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "model built"
        );

        RotaModel {
            model,
            grid,
            empty,
            pairs,
        }
    }

    /// Pre-assigned shifts per worker. Shifts naming an unknown worker are
    /// kept as history but constrain nobody.
    fn anchors(&self) -> Vec<Vec<&'a Shift>> {
        let snapshot = self.snapshot;
        let mut anchors = vec![Vec::new(); snapshot.workers.len()];
        for shift in &snapshot.shifts {
            let Some(name) = &shift.assigned_worker else {
                continue;
            };
            match snapshot.worker_index(name) {
                Some(w) => anchors[w].push(shift),
                None => warn!(shift = %shift.id, worker = %name, "pre-assigned worker not in snapshot"),
            }
        }
        anchors
    }
}

fn assignment_points(worker: &Worker, shift: &Shift, settings: &Settings) -> f64 {
    let mut points = settings.points_filled;
    if worker.prefers(shift) {
        points += settings.points_preferred;
    }
    if worker.prefers_unit(shift.unit()) {
        points += settings.points_preferred_unit;
    }
    f64::from(points)
}

/// `a + b ≤ 1`, skipped when either side is a fixed zero.
fn at_most_one(model: &mut MipModel, kind: ConstraintKind, a: VarSlot, b: VarSlot) {
    if let (VarSlot::Var(_), VarSlot::Var(_)) = (a, b) {
        let mut expr = LinearExpr::new();
        a.add_to(&mut expr, 1.0);
        b.add_to(&mut expr, 1.0);
        model.add_constraint(kind, expr, Sense::Le, 1.0);
    }
}

/// `slot ≤ 0`, skipped for a fixed zero.
fn at_most_zero(model: &mut MipModel, kind: ConstraintKind, slot: VarSlot) {
    if let VarSlot::Var(v) = slot {
        let mut expr = LinearExpr::new();
        expr.add_term(v, 1.0);
        model.add_constraint(kind, expr, Sense::Le, 0.0);
    }
}

/// Adds `aux = a AND b`. Returns `None` (the product is zero) unless both
/// halves are variables.
fn and_aux(
    model: &mut MipModel,
    kind: ConstraintKind,
    name: String,
    role: VarRole,
    a: VarSlot,
    b: VarSlot,
) -> Option<VarSlot> {
    let (VarSlot::Var(va), VarSlot::Var(vb)) = (a, b) else {
        return None;
    };
    let aux = model.add_binary(name, role);

    let mut lower = LinearExpr::new();
    lower.add_term(aux, 1.0);
    lower.add_term(va, -1.0);
    lower.add_term(vb, -1.0);
    model.add_constraint(kind, lower, Sense::Ge, -1.0);

    for v in [va, vb] {
        let mut upper = LinearExpr::new();
        upper.add_term(aux, 1.0);
        upper.add_term(v, -1.0);
        model.add_constraint(kind, upper, Sense::Le, 0.0);
    }

    Some(VarSlot::Var(aux))
}

/// Day+Night pairs in one unit already fixed to the same worker.
fn fixed_twenty_four_pairs(anchors: &[&Shift]) -> u32 {
    let count = anchors
        .iter()
        .filter(|d| d.kind() == ShiftKind::Day)
        .filter(|d| {
            anchors.iter().any(|n| {
                n.kind() == ShiftKind::Night
                    && n.day_of_month() == d.day_of_month()
                    && n.unit() == d.unit()
            })
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
