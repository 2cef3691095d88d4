//! Multi-unit rota scheduling.
//!
//! Assigns workers to Day/Night shifts across several units for one month.
//! Hard rules (one worker per shift, shift count ranges, rest between
//! consecutive shifts, same-day conflicts, 24-hour and weekend caps) are
//! encoded as a binary program; preferences and spacing are scored in the
//! objective. Solving is delegated to a MIP backend (HiGHS by default).
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Shift`, `Worker`, `RotaSnapshot`,
//!   `RotaOutcome`, plus the monthly `ShiftCatalog`
//! - **`config`**: Objective weights, rule switches, time limit
//! - **`validation`**: Input integrity checks (duplicate shifts/workers,
//!   day ranges, count ranges)
//! - **`manual`**: Fixing shifts to workers before a run
//! - **`engine`**: Pair generation, pruning, model building, extraction
//!   and scoring
//! - **`mip`**: Backend-neutral model and the solver boundary
//!
//! # Example
//! ```no_run
//! use u_rota::config::Settings;
//! use u_rota::engine::RotaEngine;
//! use u_rota::models::{ShiftCatalog, Worker};
//!
//! let mut snapshot = ShiftCatalog::new(2026, 6)
//!     .with_units(["Cardiology", "Oncology"])
//!     .with_holidays([3])
//!     .build()?;
//! snapshot.workers.push(Worker::new("Ana").with_range(4, 8).with_max_weekends(2));
//! snapshot.workers.push(Worker::new("Ben").with_range(4, 8).with_max_24hr(1));
//!
//! let outcome = RotaEngine::new().solve(&snapshot, &Settings::default())?;
//! for (unit, days) in outcome.by_unit() {
//!     println!("{unit}: {} days covered", days.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The state of the art of nurse rostering"

pub mod config;
pub mod engine;
pub mod error;
pub mod manual;
pub mod mip;
pub mod models;
pub mod validation;

pub use config::Settings;
pub use engine::{RotaEngine, RotaJob};
pub use error::EngineError;
