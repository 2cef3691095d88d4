//! Rota domain models.
//!
//! Provides the input types of a scheduling run (shifts, workers, the
//! snapshot holding both), the monthly catalog generator, and the result
//! types (roster mapping, summary, terminal status).
//!
//! # Domain Mappings
//!
//! | u-rota | Hospital | Security | Transit |
//! |--------|----------|----------|---------|
//! | Unit | Ward | Site | Depot |
//! | Shift | Day/Night cover | Patrol watch | Duty turn |
//! | Worker | Doctor/Nurse | Guard | Driver |
//! | Roster | Rota | Watch bill | Duty roster |

mod calendar;
mod roster;
mod shift;
mod snapshot;
mod worker;

pub use calendar::{CalendarError, ShiftCatalog};
pub use roster::{DayCover, RotaOutcome, RotaSummary, SolveStatus};
pub use shift::{ParseError, Shift, ShiftId, ShiftKind, ShiftSlot, ShiftTag};
pub use snapshot::RotaSnapshot;
pub use worker::{ShiftRange, Worker};
