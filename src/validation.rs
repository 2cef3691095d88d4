//! Input validation for rota snapshots.
//!
//! Checks structural integrity of the shift and worker catalogs before
//! any model is built. Detects:
//! - Duplicate shift identities
//! - Duplicate worker names
//! - Day numbers outside the month
//! - Shift count ranges with `min > max`
//! - Impossible month lengths

use crate::models::RotaSnapshot;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two shifts share the same (type, day, unit).
    DuplicateShift,
    /// Two workers share the same name.
    DuplicateWorker,
    /// A shift's day lies outside `1..=days_in_month`.
    DayOutOfRange,
    /// A worker's minimum exceeds their maximum.
    InvalidRange,
    /// `days_in_month` is not a possible month length.
    InvalidMonthLength,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a snapshot.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_snapshot(snapshot: &RotaSnapshot) -> ValidationResult {
    let mut errors = Vec::new();

    if !(1..=31).contains(&snapshot.days_in_month) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidMonthLength,
            format!("Month length {} is outside 1-31", snapshot.days_in_month),
        ));
    }

    let mut shift_ids = HashSet::new();
    for shift in &snapshot.shifts {
        if !shift_ids.insert(&shift.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateShift,
                format!("Duplicate shift: {}", shift.id),
            ));
        }
        if shift.id.day == 0 || shift.id.day > snapshot.days_in_month {
            errors.push(ValidationError::new(
                ValidationErrorKind::DayOutOfRange,
                format!(
                    "Shift '{}' is outside day range 1-{}",
                    shift.id, snapshot.days_in_month
                ),
            ));
        }
    }

    let mut names = HashSet::new();
    for worker in &snapshot.workers {
        if !names.insert(worker.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateWorker,
                format!("Duplicate worker: {}", worker.name),
            ));
        }
        if !worker.shift_range.is_valid() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRange,
                format!(
                    "Worker '{}' has range {}-{} with min above max",
                    worker.name, worker.shift_range.min, worker.shift_range.max
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
