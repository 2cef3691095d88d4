//! Rota engine.
//!
//! Runs one scheduling request end to end:
//!
//! 1. Validate the snapshot.
//! 2. Short-circuit with `NothingToAssign` when there are no empty shifts
//!    or no workers (no model is built, the solver is not called).
//! 3. Generate pairs, prune variables, and build the model.
//! 4. Solve through the guarded backend boundary.
//! 5. Extract the roster and score it.
//!
//! The engine keeps no state between runs. [`RotaEngine::spawn`] runs the
//! same pipeline on a worker thread for callers that must stay responsive.

pub mod builder;
pub mod kpi;
pub mod pairs;
pub mod pruning;

pub use builder::{RotaModel, RotaModelBuilder};
pub use kpi::extract_assignments;
pub use pairs::{AnchorLinks, ShiftPairs};
pub use pruning::{AssignmentGrid, VarSlot};

use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::EngineError;
use crate::mip::{panic_message, rounded, solve_guarded, HighsBackend, MipBackend, SolverError, SolverStatus};
use crate::models::{RotaOutcome, RotaSnapshot, RotaSummary, SolveStatus};
use crate::validation::validate_snapshot;

/// Scheduling engine over a MIP backend.
///
/// # Example
/// ```no_run
/// use u_rota::config::Settings;
/// use u_rota::engine::RotaEngine;
/// use u_rota::models::{RotaSnapshot, Shift, Worker};
///
/// let snapshot = RotaSnapshot::new(30)
///     .with_shift(Shift::day(6, "Cardiology"))
///     .with_shift(Shift::night(6, "Cardiology"))
///     .with_worker(Worker::new("Ana").with_range(1, 2));
///
/// let outcome = RotaEngine::new().solve(&snapshot, &Settings::default())?;
/// println!("{}: {} shifts filled", outcome.status(), outcome.assigned_count());
/// # Ok::<(), u_rota::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RotaEngine<B = HighsBackend> {
    backend: B,
}

impl RotaEngine<HighsBackend> {
    /// Creates an engine on the HiGHS backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: MipBackend> RotaEngine<B> {
    /// Creates an engine on a custom backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Solves one snapshot.
    ///
    /// Infeasible, time-limited and unrecognized solver outcomes are
    /// reported through the outcome's status. Errors are reserved for
    /// invalid input and solver failures.
    pub fn solve(&self, snapshot: &RotaSnapshot, settings: &Settings) -> Result<RotaOutcome, EngineError> {
        validate_snapshot(snapshot)?;

        let empty_count = snapshot.shifts.iter().filter(|s| s.is_empty()).count();
        info!(
            shifts = snapshot.shifts.len(),
            empty = empty_count,
            workers = snapshot.workers.len(),
            backend = self.backend.name(),
            "rota run started"
        );

        if empty_count == 0 || snapshot.workers.is_empty() {
            info!(status = %SolveStatus::NothingToAssign, "rota run finished");
            return Ok(unchanged(snapshot, SolveStatus::NothingToAssign));
        }

        let built = RotaModelBuilder::new(snapshot, settings).build();
        debug!(
            variables = built.model.variable_count(),
            constraints = built.model.constraint_count(),
            pruned = built.grid.pruned_count(),
            "solving"
        );

        let raw = solve_guarded(&self.backend, &built.model, settings.time_limit())?;
        let status = match raw.status {
            SolverStatus::Optimal => SolveStatus::Optimal,
            SolverStatus::TimeLimit => SolveStatus::NotSolved,
            SolverStatus::Infeasible => SolveStatus::Infeasible,
            SolverStatus::Other(message) => SolveStatus::Other(message),
        };

        if !status.has_solution() {
            info!(%status, "rota run finished");
            return Ok(unchanged(snapshot, status));
        }

        let values = rounded(&raw.values);
        let total_points = built.model.objective().evaluate(&values);
        let assignments = extract_assignments(snapshot, &built, &values);
        let summary = RotaSummary::calculate(
            &assignments,
            &snapshot.workers,
            settings.spacing_days_threshold,
            status,
            Some(total_points),
        );

        info!(
            status = %summary.status,
            total_points,
            twenty_four = summary.twenty_four_count,
            spacing_violations = summary.spacing_violation_count,
            "rota run finished"
        );
        Ok(RotaOutcome {
            assignments,
            summary,
        })
    }
}

impl<B: MipBackend + Clone + 'static> RotaEngine<B> {
    /// Runs [`solve`](Self::solve) on a named worker thread.
    ///
    /// The snapshot is moved onto the thread, so the caller cannot mutate
    /// it during the run.
    pub fn spawn(&self, snapshot: RotaSnapshot, settings: Settings) -> Result<RotaJob, EngineError> {
        let engine = self.clone();
        let handle = thread::Builder::new()
            .name("rota-engine".into())
            .spawn(move || engine.solve(&snapshot, &settings))
            .map_err(|e| SolverError::Backend(format!("cannot spawn engine thread: {e}")))?;
        Ok(RotaJob { handle })
    }
}

/// A run in progress on a worker thread.
#[derive(Debug)]
pub struct RotaJob {
    handle: JoinHandle<Result<RotaOutcome, EngineError>>,
}

impl RotaJob {
    /// Whether the run has finished; never blocks.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the run finishes.
    pub fn wait(self) -> Result<RotaOutcome, EngineError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(payload) => Err(SolverError::Crashed(panic_message(payload.as_ref())).into()),
        }
    }
}

/// The snapshot's own mapping with an all-zero summary.
fn unchanged(snapshot: &RotaSnapshot, status: SolveStatus) -> RotaOutcome {
    RotaOutcome {
        assignments: snapshot
            .shifts
            .iter()
            .map(|s| (s.id.clone(), s.assigned_worker.clone()))
            .collect(),
        summary: RotaSummary::empty(status),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::mip::{MipModel, RawSolution};
    use crate::models::{Shift, ShiftId, ShiftKind, ShiftSlot, ShiftTag, Worker};

    #[derive(Clone)]
    struct Panicking;

    impl MipBackend for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn solve(&self, _: &MipModel, _: Duration) -> Result<RawSolution, SolverError> {
            panic!("solver killed")
        }
    }

    /// Returns a fixed status; with `fill`, every variable is set to `fill`.
    #[derive(Clone)]
    struct Fixed {
        status: SolverStatus,
        fill: Option<f64>,
    }

    impl MipBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn solve(&self, model: &MipModel, _: Duration) -> Result<RawSolution, SolverError> {
            Ok(match self.fill {
                Some(v) => RawSolution::new(self.status.clone(), vec![v; model.variable_count()]),
                None => RawSolution::bare(self.status.clone()),
            })
        }
    }

    fn settings() -> Settings {
        Settings::default().with_time_limit_secs(20)
    }

    fn held<'a>(outcome: &'a RotaOutcome, worker: &str) -> Vec<&'a ShiftId> {
        outcome.shifts_of(worker)
    }

    fn three_day_unit() -> Vec<Shift> {
        (1..=3)
            .flat_map(|d| [Shift::day(d, "A"), Shift::night(d, "A")])
            .collect()
    }

    #[test]
    fn test_two_workers_three_days() {
        let snap = RotaSnapshot::new(30)
            .with_shifts(three_day_unit())
            .with_worker(Worker::new("Ana").with_range(1, 2))
            .with_worker(Worker::new("Ben").with_range(1, 2));
        let outcome = RotaEngine::new().solve(&snap, &settings()).unwrap();

        assert_eq!(outcome.status(), &SolveStatus::Optimal);
        // Two workers with at most two shifts each fill four of six.
        assert_eq!(outcome.assigned_count(), 4);
        for name in ["Ana", "Ben"] {
            let shifts = held(&outcome, name);
            assert!((1..=2).contains(&shifts.len()));
            let nights: Vec<u32> = shifts
                .iter()
                .filter(|id| id.kind == ShiftKind::Night)
                .map(|id| id.day)
                .collect();
            assert!(nights.windows(2).all(|w| w[1] - w[0] > 1));
        }
        // Every worker pair of shifts is within four days.
        assert_eq!(outcome.summary.spacing_violation_count, 2);
        assert_eq!(outcome.summary.total_points, Some(396.0));
    }

    #[test]
    fn test_minimum_above_supply_is_infeasible() {
        let snap = RotaSnapshot::new(30)
            .with_shifts([Shift::day(1, "A"), Shift::night(3, "A"), Shift::day(5, "A")])
            .with_worker(Worker::new("Ana").with_range(5, 5));
        let outcome = RotaEngine::with_backend(Panicking)
            .solve(&snap, &settings())
            .unwrap();

        assert_eq!(outcome.status(), &SolveStatus::Infeasible);
        assert_eq!(outcome.assigned_count(), 0);
        assert_eq!(outcome.summary, RotaSummary::empty(SolveStatus::Infeasible));
    }

    #[test]
    fn test_all_pairs_pruned_skips_solver() {
        let snap = RotaSnapshot::new(30)
            .with_shift(Shift::day(1, "A"))
            .with_worker(
                Worker::new("Ana")
                    .with_range(0, 1)
                    .with_forbidden(ShiftSlot::day(1)),
            );
        let outcome = RotaEngine::with_backend(Panicking)
            .solve(&snap, &settings())
            .unwrap();

        assert_eq!(outcome.status(), &SolveStatus::Optimal);
        assert_eq!(outcome.assigned_count(), 0);
        assert_eq!(outcome.summary.total_points, Some(0.0));
    }

    #[test]
    fn test_no_workers_skips_solver() {
        let snap = RotaSnapshot::new(30).with_shifts(three_day_unit());
        let outcome = RotaEngine::with_backend(Panicking)
            .solve(&snap, &settings())
            .unwrap();

        assert_eq!(outcome.status(), &SolveStatus::NothingToAssign);
        assert_eq!(outcome.summary, RotaSummary::empty(SolveStatus::NothingToAssign));
        assert_eq!(outcome.assignments.len(), 6);
    }

    #[test]
    fn test_no_empty_shifts_skips_solver() {
        let snap = RotaSnapshot::new(30)
            .with_shift(Shift::day(1, "A").assigned_to("Ana"))
            .with_worker(Worker::new("Ana").with_range(0, 2));
        let outcome = RotaEngine::with_backend(Panicking)
            .solve(&snap, &settings())
            .unwrap();

        assert_eq!(outcome.status(), &SolveStatus::NothingToAssign);
        assert_eq!(outcome.worker_for(&ShiftId::new(ShiftKind::Day, 1, "A")), Some("Ana"));
    }

    #[test]
    fn test_preassigned_day_blocks_night_without_24hr_allowance() {
        let night = ShiftId::new(ShiftKind::Night, 5, "A");
        let snap = RotaSnapshot::new(30)
            .with_shifts([
                Shift::day(5, "A").assigned_to("Ana"),
                Shift::night(5, "A"),
                Shift::day(10, "A"),
            ])
            .with_worker(Worker::new("Ana").with_range(1, 1).with_max_24hr(0))
            .with_worker(Worker::new("Ben").with_range(0, 1));
        let outcome = RotaEngine::new().solve(&snap, &settings()).unwrap();

        assert_eq!(outcome.status(), &SolveStatus::Optimal);
        assert_eq!(outcome.worker_for(&night), Some("Ben"));
        assert_eq!(
            outcome.worker_for(&ShiftId::new(ShiftKind::Day, 10, "A")),
            Some("Ana")
        );
        assert_eq!(outcome.summary.twenty_four_count, 0);

        // Alone, Ana still cannot take it.
        let alone = RotaSnapshot {
            workers: vec![Worker::new("Ana").with_range(0, 2).with_max_24hr(0)],
            ..snap
        };
        let outcome = RotaEngine::new().solve(&alone, &settings()).unwrap();
        assert_eq!(outcome.status(), &SolveStatus::Optimal);
        assert_eq!(outcome.worker_for(&night), None);
    }

    #[test]
    fn test_spacing_is_soft() {
        let snap = RotaSnapshot::new(30)
            .with_shifts([Shift::day(1, "A"), Shift::day(4, "A")])
            .with_worker(Worker::new("Ana").with_range(2, 2));
        let outcome = RotaEngine::new()
            .solve(&snap, &settings().with_spacing_threshold(5))
            .unwrap();

        assert_eq!(outcome.status(), &SolveStatus::Optimal);
        assert_eq!(outcome.assigned_count(), 2);
        assert_eq!(outcome.summary.spacing_violation_count, 1);
        assert_eq!(outcome.summary.total_points, Some(198.0));
    }

    #[test]
    fn test_pruning_does_not_change_optimum() {
        let shifts: Vec<Shift> = (1..=4)
            .flat_map(|d| [Shift::day(d, "A"), Shift::night(d, "A")])
            .collect();
        let snap = RotaSnapshot::new(30)
            .with_shifts(shifts)
            .with_worker(
                Worker::new("Ana")
                    .with_range(1, 3)
                    .with_forbidden(ShiftSlot::night(2))
                    .with_forbidden(ShiftSlot::day(3)),
            )
            .with_worker(
                Worker::new("Ben")
                    .with_range(1, 3)
                    .with_forbidden(ShiftSlot::day(1)),
            )
            .with_worker(
                Worker::new("Cy")
                    .with_range(0, 2)
                    .with_preferred(ShiftSlot::night(4)),
            );

        let engine = RotaEngine::new();
        let pruned = engine.solve(&snap, &settings()).unwrap();
        let full = engine.solve(&snap, &settings().with_pruning(false)).unwrap();

        assert_eq!(pruned.status(), &SolveStatus::Optimal);
        assert_eq!(full.status(), &SolveStatus::Optimal);
        assert_eq!(pruned.summary.total_points, full.summary.total_points);
        for outcome in [&pruned, &full] {
            assert!(held(outcome, "Ana")
                .iter()
                .all(|id| id.slot() != ShiftSlot::night(2) && id.slot() != ShiftSlot::day(3)));
            assert!(held(outcome, "Ben").iter().all(|id| id.slot() != ShiftSlot::day(1)));
        }
    }

    #[test]
    fn test_backend_statuses_pass_through() {
        let snap = RotaSnapshot::new(30)
            .with_shift(Shift::day(1, "A"))
            .with_worker(Worker::new("Ana").with_range(0, 1));

        let infeasible = Fixed {
            status: SolverStatus::Infeasible,
            fill: None,
        };
        let outcome = RotaEngine::with_backend(infeasible).solve(&snap, &settings()).unwrap();
        assert_eq!(outcome.status(), &SolveStatus::Infeasible);

        let other = Fixed {
            status: SolverStatus::Other("numerical trouble".into()),
            fill: None,
        };
        let outcome = RotaEngine::with_backend(other).solve(&snap, &settings()).unwrap();
        assert_eq!(outcome.status(), &SolveStatus::Other("numerical trouble".into()));
        assert_eq!(outcome.assigned_count(), 0);
    }

    #[test]
    fn test_time_limit_keeps_incumbent() {
        let snap = RotaSnapshot::new(30)
            .with_shift(Shift::day(1, "A"))
            .with_worker(Worker::new("Ana").with_range(0, 1));
        let backend = Fixed {
            status: SolverStatus::TimeLimit,
            fill: Some(1.0),
        };
        let outcome = RotaEngine::with_backend(backend).solve(&snap, &settings()).unwrap();

        assert_eq!(outcome.status(), &SolveStatus::NotSolved);
        assert_eq!(
            outcome.worker_for(&ShiftId::new(ShiftKind::Day, 1, "A")),
            Some("Ana")
        );
        assert_eq!(outcome.summary.total_points, Some(100.0));
    }

    #[test]
    fn test_solver_crash_is_an_error() {
        let snap = RotaSnapshot::new(30)
            .with_shift(Shift::day(1, "A"))
            .with_worker(Worker::new("Ana").with_range(0, 1));
        let err = RotaEngine::with_backend(Panicking)
            .solve(&snap, &settings())
            .unwrap_err();
        assert_eq!(err, EngineError::Solver(SolverError::Crashed("solver killed".into())));
    }

    #[test]
    fn test_invalid_input_rejected() {
        let snap = RotaSnapshot::new(30)
            .with_shift(Shift::day(1, "A"))
            .with_worker(Worker::new("Ana"))
            .with_worker(Worker::new("Ana"));
        let err = RotaEngine::with_backend(Panicking)
            .solve(&snap, &settings())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(ref e) if e.len() == 1));
    }

    #[test]
    fn test_spawned_run() {
        let snap = RotaSnapshot::new(30)
            .with_shift(Shift::night(2, "A"))
            .with_worker(Worker::new("Ana").with_range(0, 1));
        let backend = Fixed {
            status: SolverStatus::Optimal,
            fill: Some(1.0),
        };
        let job = RotaEngine::with_backend(backend)
            .spawn(snap, settings())
            .unwrap();
        let outcome = job.wait().unwrap();
        assert_eq!(outcome.assigned_count(), 1);

        let job = RotaEngine::with_backend(Panicking)
            .spawn(
                RotaSnapshot::new(30)
                    .with_shift(Shift::night(2, "A"))
                    .with_worker(Worker::new("Ana").with_range(0, 1)),
                settings(),
            )
            .unwrap();
        assert!(matches!(
            job.wait(),
            Err(EngineError::Solver(SolverError::Crashed(_)))
        ));
    }

    fn random_snapshot(rng: &mut StdRng) -> RotaSnapshot {
        let days = rng.random_range(3..=7);
        let units = ["A", "B"];
        let mut snapshot = RotaSnapshot::new(30);
        for day in 1..=days {
            for unit in &units[..rng.random_range(1..=2)] {
                for kind in ShiftKind::ALL {
                    if rng.random_bool(0.75) {
                        let mut shift = Shift::new(kind, day, *unit);
                        if day % 7 == 6 || day % 7 == 0 {
                            shift = shift.with_tag(ShiftTag::Weekend);
                        }
                        snapshot.shifts.push(shift);
                    }
                }
            }
        }
        for name in ["Ana", "Ben", "Cy"].iter().take(rng.random_range(1..=3)) {
            let mut worker = Worker::new(*name)
                .with_range(0, rng.random_range(1..=4))
                .with_max_24hr(rng.random_range(0..=1))
                .with_max_weekends(rng.random_range(0..=2));
            if rng.random_bool(0.5) {
                let kind = if rng.random_bool(0.5) { ShiftKind::Day } else { ShiftKind::Night };
                worker = worker.with_forbidden(ShiftSlot::new(kind, rng.random_range(1..=days)));
            }
            // At most one fixed shift per worker, on a slot they may work.
            if !snapshot.shifts.is_empty() && rng.random_bool(0.5) {
                let pick = rng.random_range(0..snapshot.shifts.len());
                let shift = &mut snapshot.shifts[pick];
                if shift.is_empty() && worker.can_work(shift) {
                    shift.assigned_worker = Some(worker.name.clone());
                }
            }
            snapshot.workers.push(worker);
        }
        snapshot
    }

    fn assert_legal(snapshot: &RotaSnapshot, outcome: &RotaOutcome, settings: &Settings) {
        let by_id: BTreeMap<&ShiftId, &Shift> = snapshot.shifts.iter().map(|s| (&s.id, s)).collect();

        for worker in &snapshot.workers {
            let shifts = outcome.shifts_of(&worker.name);
            // Ranges count solver-assigned shifts only.
            let chosen = shifts.iter().filter(|id| by_id[*id].is_empty()).count();
            assert!(worker.shift_range.contains(chosen as u32));

            let mut twenty_four = 0;
            for (i, a) in shifts.iter().enumerate() {
                assert!(!worker.forbidden_shifts.contains(&a.slot()));
                for b in &shifts[i + 1..] {
                    // shifts_of is chronological: a precedes b
                    if a.day == b.day {
                        assert!(a.unit == b.unit && a.kind != b.kind, "{a} / {b}");
                        twenty_four += 1;
                    } else if b.day == a.day + 1 {
                        match (a.kind, b.kind) {
                            (ShiftKind::Night, ShiftKind::Day) => panic!("{a} then {b}"),
                            (ShiftKind::Night, ShiftKind::Night) => {
                                assert!(!settings.enforce_no_adjacent_nights)
                            }
                            (ShiftKind::Day, ShiftKind::Day) => {
                                assert!(!settings.enforce_no_adjacent_days)
                            }
                            (ShiftKind::Day, ShiftKind::Night) => {}
                        }
                    }
                }
            }
            assert!(twenty_four <= worker.max_24hr_count);

            let (fixed, chosen): (Vec<&Shift>, Vec<&Shift>) = shifts
                .iter()
                .map(|id| by_id[*id])
                .filter(|s| s.is_weekend())
                .partition(|s| !s.is_empty());
            let cap = worker.max_weekend_count.saturating_sub(fixed.len() as u32);
            assert!(chosen.len() as u32 <= cap, "{}: weekend cap", worker.name);
        }
    }

    #[test]
    fn test_random_rosters_respect_hard_rules() {
        let mut rng = StdRng::seed_from_u64(2026);
        let engine = RotaEngine::new();
        for round in 0..16 {
            let snapshot = random_snapshot(&mut rng);
            let settings = settings()
                .with_no_adjacent_nights(round % 2 == 0)
                .with_no_adjacent_days(round % 3 != 0);
            let outcome = engine.solve(&snapshot, &settings).unwrap();

            if snapshot.shifts.iter().all(|s| !s.is_empty()) {
                assert_eq!(outcome.status(), &SolveStatus::NothingToAssign);
                continue;
            }
            // Every minimum is zero, so the empty roster is always feasible.
            assert_eq!(outcome.status(), &SolveStatus::Optimal);
            assert_legal(&snapshot, &outcome, &settings);
        }
    }
}
