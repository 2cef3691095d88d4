//! Engine error type.

use thiserror::Error;

use crate::mip::SolverError;
use crate::validation::ValidationError;

/// Errors returned by [`crate::engine::RotaEngine`].
///
/// Solver statuses such as infeasible or time limit are not errors; they
/// come back inside the outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The snapshot failed validation.
    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),
    /// The solver boundary failed.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for EngineError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::InvalidInput(errors)
    }
}
