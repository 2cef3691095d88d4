//! HiGHS backend via `good_lp`.

use std::thread;
use std::time::Duration;

use good_lp::solvers::highs::highs;
use good_lp::{
    variable, variables, Expression, ResolutionError, Solution, SolutionStatus, SolverModel,
    Variable,
};
use tracing::debug;

use super::{
    panic_message, LinearExpr, MipBackend, MipModel, RawSolution, Sense, SolverError,
    SolverStatus,
};

/// Solves models with HiGHS on a dedicated named thread.
///
/// The native solver runs on `highs-worker`; a panic there is reported as
/// [`SolverError::Crashed`] and never reaches the caller's thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsBackend;

impl MipBackend for HighsBackend {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, model: &MipModel, time_limit: Duration) -> Result<RawSolution, SolverError> {
        thread::scope(|scope| {
            let handle = thread::Builder::new()
                .name("highs-worker".into())
                .spawn_scoped(scope, || run_highs(model, time_limit))
                .map_err(|e| SolverError::Backend(format!("cannot spawn solver thread: {e}")))?;

            match handle.join() {
                Ok(raw) => Ok(raw),
                Err(payload) => Err(SolverError::Crashed(panic_message(payload.as_ref()))),
            }
        })
    }
}

fn to_expression(expr: &LinearExpr, xs: &[Variable]) -> Expression {
    expr.terms()
        .iter()
        .fold(Expression::from(expr.constant_value()), |acc, &(v, c)| {
            acc + c * xs[v.index()]
        })
}

fn run_highs(model: &MipModel, time_limit: Duration) -> RawSolution {
    let mut vars = variables!();
    let xs: Vec<Variable> = model
        .variables()
        .iter()
        .map(|v| vars.add(variable().binary().name(v.name.clone())))
        .collect();

    let objective = to_expression(model.objective(), &xs);
    let mut problem = vars
        .maximise(objective)
        .using(highs)
        .set_time_limit(time_limit.as_secs_f64());

    for c in model.constraints() {
        let lhs = to_expression(&c.expr, &xs);
        match c.sense {
            Sense::Le => problem.add_constraint(lhs.leq(c.rhs)),
            Sense::Ge => problem.add_constraint(lhs.geq(c.rhs)),
        };
    }

    debug!(
        model = model.name(),
        variables = xs.len(),
        constraints = model.constraint_count(),
        "handing model to HiGHS"
    );

    match problem.solve() {
        Ok(solution) => {
            let status = match solution.status() {
                SolutionStatus::Optimal | SolutionStatus::GapLimit => SolverStatus::Optimal,
                SolutionStatus::TimeLimit => SolverStatus::TimeLimit,
                #[allow(unreachable_patterns)]
                other => SolverStatus::Other(format!("{other:?}")),
            };
            let values = xs.iter().map(|&x| solution.value(x)).collect();
            RawSolution::new(status, values)
        }
        Err(ResolutionError::Infeasible) => RawSolution::bare(SolverStatus::Infeasible),
        Err(e) => RawSolution::bare(SolverStatus::Other(e.to_string())),
    }
}
