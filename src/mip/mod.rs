//! Backend-neutral mixed-integer model and solver boundary.
//!
//! The model builder produces a [`MipModel`]: binary variables, a linear
//! objective to maximize, and labelled linear constraints. A
//! [`MipBackend`] turns it into a terminal status plus variable values.
//! Backends are swappable without touching the builder; the default is
//! [`HighsBackend`].
//!
//! [`solve_guarded`] is the only entry point the engine uses. It catches
//! backend panics and validates what comes back, so a misbehaving solver
//! surfaces as a [`SolverError`] instead of an unwinding thread.

mod highs;

pub use highs::HighsBackend;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Tolerance used when checking solution values against constraints.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Handle to a binary variable of a [`MipModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a variable stands for. Indices refer to the builder's worker list,
/// empty-shift list, and pair lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarRole {
    /// Worker takes an empty shift.
    Assign { worker: usize, shift: usize },
    /// Worker takes both halves of a 24-hour pair.
    TwentyFour { worker: usize, pair: usize },
    /// Worker takes both shifts of a spacing pair.
    Spacing { worker: usize, pair: usize },
}

/// A binary decision variable.
#[derive(Debug, Clone)]
pub struct BinaryVar {
    pub name: String,
    pub role: VarRole,
}

/// `constant + Σ coef · var`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Adds `coef · var`. Zero coefficients are dropped.
    pub fn add_term(&mut self, var: VarId, coef: f64) {
        if coef != 0.0 {
            self.terms.push((var, coef));
        }
    }

    #[inline]
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    #[inline]
    pub fn constant_value(&self) -> f64 {
        self.constant
    }

    /// Whether the expression has no variables.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Smallest and largest value over all 0/1 assignments.
    pub fn bounds(&self) -> (f64, f64) {
        self.terms
            .iter()
            .fold((self.constant, self.constant), |(lo, hi), &(_, c)| {
                if c < 0.0 {
                    (lo + c, hi)
                } else {
                    (lo, hi + c)
                }
            })
    }

    /// Value under the given variable assignment.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(v, c)| acc + c * values[v.0])
    }
}

/// Constraint direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `expr ≤ rhs`
    Le,
    /// `expr ≥ rhs`
    Ge,
}

/// Which rule a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// At most one worker per shift.
    ShiftCapacity,
    /// Worker's lower shift count bound.
    WorkerMin,
    /// Worker's upper shift count bound.
    WorkerMax,
    /// Night followed by Day on the next day.
    NightToDay,
    /// Night followed by Night on the next day.
    AdjacentNights,
    /// Day followed by Day on the next day.
    AdjacentDays,
    /// Two shifts on one day that are not a same-unit Day+Night pair.
    SameDay,
    /// AND-linearization of a 24-hour auxiliary.
    TwentyFourLink,
    /// Worker's 24-hour cap.
    TwentyFourCap,
    /// Worker's weekend cap.
    WeekendCap,
    /// AND-linearization of a spacing auxiliary.
    SpacingLink,
    /// Forbidden slot zeroing.
    Forbidden,
    /// Zeroing relative to a pre-assigned shift.
    PreAssigned,
}

/// A labelled linear constraint.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + FEASIBILITY_TOLERANCE,
            Sense::Ge => lhs >= self.rhs - FEASIBILITY_TOLERANCE,
        }
    }
}

/// A binary maximization model.
#[derive(Debug, Clone)]
pub struct MipModel {
    name: String,
    variables: Vec<BinaryVar>,
    objective: LinearExpr,
    constraints: Vec<LinearConstraint>,
    contradiction: Option<ConstraintKind>,
}

impl MipModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            objective: LinearExpr::new(),
            constraints: Vec::new(),
            contradiction: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a binary variable.
    pub fn add_binary(&mut self, name: impl Into<String>, role: VarRole) -> VarId {
        self.variables.push(BinaryVar {
            name: name.into(),
            role,
        });
        VarId(self.variables.len() - 1)
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    /// Adds `expr (sense) rhs`.
    ///
    /// All variables are binary, so the range of `expr` is known up front.
    /// A constraint that holds over the whole range is dropped; one that
    /// holds nowhere marks the model as contradictory.
    pub fn add_constraint(&mut self, kind: ConstraintKind, expr: LinearExpr, sense: Sense, rhs: f64) {
        let (low, high) = expr.bounds();
        let (always, never) = match sense {
            Sense::Le => (high <= rhs + FEASIBILITY_TOLERANCE, low > rhs + FEASIBILITY_TOLERANCE),
            Sense::Ge => (low >= rhs - FEASIBILITY_TOLERANCE, high < rhs - FEASIBILITY_TOLERANCE),
        };
        if never {
            if self.contradiction.is_none() {
                self.contradiction = Some(kind);
            }
            return;
        }
        if always {
            return;
        }
        self.constraints.push(LinearConstraint {
            kind,
            expr,
            sense,
            rhs,
        });
    }

    #[inline]
    pub fn variables(&self) -> &[BinaryVar] {
        &self.variables
    }

    #[inline]
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    #[inline]
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    #[inline]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints of one kind.
    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    /// First variable-free constraint that could not hold, if any.
    pub fn contradiction(&self) -> Option<ConstraintKind> {
        self.contradiction
    }

    /// Whether `values` satisfies every constraint and is integral.
    pub fn is_satisfied_by(&self, values: &[f64]) -> bool {
        self.contradiction.is_none()
            && values.len() == self.variables.len()
            && values
                .iter()
                .all(|v| v.abs() <= FEASIBILITY_TOLERANCE || (v - 1.0).abs() <= FEASIBILITY_TOLERANCE)
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }
}

/// Raw terminal status reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal.
    Optimal,
    /// Stopped at the time limit with an incumbent.
    TimeLimit,
    /// No feasible assignment exists.
    Infeasible,
    /// Anything else, described by the backend.
    Other(String),
}

/// Status and variable values returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    pub status: SolverStatus,
    /// One value per model variable; empty without a solution.
    pub values: Vec<f64>,
}

impl RawSolution {
    pub fn new(status: SolverStatus, values: Vec<f64>) -> Self {
        Self { status, values }
    }

    /// A status with no values.
    pub fn bare(status: SolverStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
        }
    }
}

/// Failure at the solver boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The backend panicked or its thread died.
    #[error("solver crashed: {0}")]
    Crashed(String),
    /// The backend could not run or returned malformed output.
    #[error("solver backend failure: {0}")]
    Backend(String),
}

/// A mixed-integer solver.
pub trait MipBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Solves `model` (maximization), stopping after `time_limit`.
    fn solve(&self, model: &MipModel, time_limit: Duration) -> Result<RawSolution, SolverError>;
}

/// Runs a backend with the engine's safety checks.
///
/// - A contradictory model is reported infeasible without calling the backend.
/// - A model without variables is trivially optimal and skips the backend.
/// - Panics become [`SolverError::Crashed`].
/// - A value vector of the wrong length is a [`SolverError::Backend`].
/// - A time-limited result whose values do not satisfy the model (no
///   incumbent was found) is reported as [`SolverStatus::Other`].
pub fn solve_guarded<B: MipBackend + ?Sized>(
    backend: &B,
    model: &MipModel,
    time_limit: Duration,
) -> Result<RawSolution, SolverError> {
    if let Some(kind) = model.contradiction() {
        debug!(?kind, "model contains an unsatisfiable constant constraint");
        return Ok(RawSolution::bare(SolverStatus::Infeasible));
    }
    if model.variable_count() == 0 {
        debug!("model has no variables");
        return Ok(RawSolution::new(SolverStatus::Optimal, Vec::new()));
    }

    let raw = catch_unwind(AssertUnwindSafe(|| backend.solve(model, time_limit)))
        .map_err(|payload| SolverError::Crashed(panic_message(payload.as_ref())))??;

    match raw.status {
        SolverStatus::Optimal | SolverStatus::TimeLimit
            if raw.values.len() != model.variable_count() =>
        {
            Err(SolverError::Backend(format!(
                "{} returned {} values for {} variables",
                backend.name(),
                raw.values.len(),
                model.variable_count()
            )))
        }
        SolverStatus::TimeLimit if !model.is_satisfied_by(&rounded(&raw.values)) => Ok(
            RawSolution::bare(SolverStatus::Other(
                "no feasible solution within time limit".into(),
            )),
        ),
        _ => Ok(raw),
    }
}

/// Rounds solver values to exact 0/1.
pub fn rounded(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v >= 0.5 { 1.0 } else { 0.0 })
        .collect()
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(RawSolution);

    impl MipBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn solve(&self, _: &MipModel, _: Duration) -> Result<RawSolution, SolverError> {
            Ok(self.0.clone())
        }
    }

    struct Panicking;

    impl MipBackend for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn solve(&self, _: &MipModel, _: Duration) -> Result<RawSolution, SolverError> {
            panic!("solver process killed")
        }
    }

    fn two_var_model() -> MipModel {
        let mut m = MipModel::new("t");
        let a = m.add_binary("a", VarRole::Assign { worker: 0, shift: 0 });
        let b = m.add_binary("b", VarRole::Assign { worker: 0, shift: 1 });
        let mut e = LinearExpr::new();
        e.add_term(a, 1.0);
        e.add_term(b, 1.0);
        m.add_constraint(ConstraintKind::ShiftCapacity, e, Sense::Le, 1.0);
        m
    }

    #[test]
    fn test_constant_constraints() {
        let mut m = MipModel::new("t");
        m.add_constraint(ConstraintKind::WorkerMax, LinearExpr::new(), Sense::Le, 2.0);
        assert_eq!(m.constraint_count(), 0);
        assert_eq!(m.contradiction(), None);

        m.add_constraint(ConstraintKind::WorkerMin, LinearExpr::new(), Sense::Ge, 1.0);
        assert_eq!(m.contradiction(), Some(ConstraintKind::WorkerMin));
    }

    #[test]
    fn test_activity_bounds() {
        let mut m = MipModel::new("t");
        let a = m.add_binary("a", VarRole::Assign { worker: 0, shift: 0 });
        let b = m.add_binary("b", VarRole::Assign { worker: 0, shift: 1 });
        let mut e = LinearExpr::new();
        e.add_term(a, 1.0);
        e.add_term(b, 1.0);
        assert_eq!(e.bounds(), (0.0, 2.0));

        // a + b ≤ 2 always holds
        m.add_constraint(ConstraintKind::WorkerMax, e.clone(), Sense::Le, 2.0);
        assert_eq!(m.constraint_count(), 0);
        // a + b ≥ 1 is a real restriction
        m.add_constraint(ConstraintKind::WorkerMin, e.clone(), Sense::Ge, 1.0);
        assert_eq!(m.constraint_count(), 1);
        assert_eq!(m.contradiction(), None);
        // a + b ≥ 3 can never hold
        m.add_constraint(ConstraintKind::WorkerMin, e, Sense::Ge, 3.0);
        assert_eq!(m.contradiction(), Some(ConstraintKind::WorkerMin));

        let mut link = LinearExpr::new();
        link.add_term(a, 1.0);
        link.add_term(b, -1.0);
        assert_eq!(link.bounds(), (-1.0, 1.0));
    }

    #[test]
    fn test_zero_coefficients_dropped() {
        let mut m = MipModel::new("t");
        let a = m.add_binary("a", VarRole::Assign { worker: 0, shift: 0 });
        let mut e = LinearExpr::constant(3.0);
        e.add_term(a, 0.0);
        assert!(e.is_constant());
        e.add_term(a, 2.0);
        assert_eq!(e.evaluate(&[1.0]), 5.0);
    }

    #[test]
    fn test_is_satisfied_by() {
        let m = two_var_model();
        assert!(m.is_satisfied_by(&[1.0, 0.0]));
        assert!(!m.is_satisfied_by(&[1.0, 1.0]));
        assert!(!m.is_satisfied_by(&[0.5, 0.0]));
        assert!(!m.is_satisfied_by(&[1.0]));
    }

    #[test]
    fn test_guard_catches_panic() {
        let err = solve_guarded(&Panicking, &two_var_model(), Duration::from_secs(1)).unwrap_err();
        assert_eq!(err, SolverError::Crashed("solver process killed".into()));
    }

    #[test]
    fn test_guard_skips_backend_on_contradiction() {
        let mut m = two_var_model();
        m.add_constraint(ConstraintKind::WorkerMin, LinearExpr::new(), Sense::Ge, 5.0);
        let raw = solve_guarded(&Panicking, &m, Duration::from_secs(1)).unwrap();
        assert_eq!(raw.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_guard_empty_model_is_optimal() {
        let mut m = MipModel::new("empty");
        m.add_constraint(ConstraintKind::WorkerMax, LinearExpr::new(), Sense::Le, 1.0);
        let raw = solve_guarded(&Panicking, &m, Duration::from_secs(1)).unwrap();
        assert_eq!(raw.status, SolverStatus::Optimal);
        assert!(raw.values.is_empty());
    }

    #[test]
    fn test_guard_rejects_wrong_length() {
        let backend = Fixed(RawSolution::new(SolverStatus::Optimal, vec![1.0]));
        let err = solve_guarded(&backend, &two_var_model(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SolverError::Backend(_)));
    }

    #[test]
    fn test_guard_time_limit_without_incumbent() {
        let backend = Fixed(RawSolution::new(SolverStatus::TimeLimit, vec![1.0, 1.0]));
        let raw = solve_guarded(&backend, &two_var_model(), Duration::from_secs(1)).unwrap();
        assert!(matches!(raw.status, SolverStatus::Other(_)));

        let backend = Fixed(RawSolution::new(SolverStatus::TimeLimit, vec![0.0, 1.0]));
        let raw = solve_guarded(&backend, &two_var_model(), Duration::from_secs(1)).unwrap();
        assert_eq!(raw.status, SolverStatus::TimeLimit);
    }

    #[test]
    fn test_rounded() {
        assert_eq!(rounded(&[0.9999, 1e-9, 0.49]), vec![1.0, 0.0, 0.0]);
    }
}
