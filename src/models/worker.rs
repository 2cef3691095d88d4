//! Worker model.
//!
//! Workers are the people who cover shifts. Each carries hard limits
//! (shift count range, prohibited slots, 24-hour and weekend caps) and
//! soft preferences (preferred slots and units).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Shift, ShiftSlot};

/// Inclusive bounds on the number of shifts the engine may assign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRange {
    pub min: u32,
    pub max: u32,
}

impl ShiftRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `count` lies within the range.
    #[inline]
    pub fn contains(&self, count: u32) -> bool {
        self.min <= count && count <= self.max
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// The range left after `taken` shifts were handed out elsewhere.
    pub fn reduced_by(&self, taken: u32) -> Self {
        Self {
            min: self.min.saturating_sub(taken),
            max: self.max.saturating_sub(taken),
        }
    }
}

/// A worker available for the rota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique worker name.
    pub name: String,
    /// Number of shifts the engine may assign.
    pub shift_range: ShiftRange,
    /// Slots this worker never takes, in any unit.
    #[serde(default)]
    pub forbidden_shifts: BTreeSet<ShiftSlot>,
    /// Slots this worker would like, in any unit.
    #[serde(default)]
    pub preferred_shifts: BTreeSet<ShiftSlot>,
    /// Units this worker would like to work in.
    #[serde(default)]
    pub preferred_units: BTreeSet<String>,
    /// Cap on Day+Night pairs in the same unit on the same day.
    #[serde(default)]
    pub max_24hr_count: u32,
    /// Cap on weekend-tagged shifts.
    #[serde(default)]
    pub max_weekend_count: u32,
}

impl Worker {
    /// Creates a worker with no preferences, an empty range, and zero caps.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shift_range: ShiftRange::default(),
            forbidden_shifts: BTreeSet::new(),
            preferred_shifts: BTreeSet::new(),
            preferred_units: BTreeSet::new(),
            max_24hr_count: 0,
            max_weekend_count: 0,
        }
    }

    /// Sets the shift count range.
    pub fn with_range(mut self, min: u32, max: u32) -> Self {
        self.shift_range = ShiftRange::new(min, max);
        self
    }

    /// Adds a prohibited slot.
    pub fn with_forbidden(mut self, slot: ShiftSlot) -> Self {
        self.forbidden_shifts.insert(slot);
        self
    }

    /// Adds a preferred slot.
    pub fn with_preferred(mut self, slot: ShiftSlot) -> Self {
        self.preferred_shifts.insert(slot);
        self
    }

    /// Adds a preferred unit.
    pub fn with_preferred_unit(mut self, unit: impl Into<String>) -> Self {
        self.preferred_units.insert(unit.into());
        self
    }

    pub fn with_max_24hr(mut self, count: u32) -> Self {
        self.max_24hr_count = count;
        self
    }

    pub fn with_max_weekends(mut self, count: u32) -> Self {
        self.max_weekend_count = count;
        self
    }

    #[inline]
    pub fn can_work(&self, shift: &Shift) -> bool {
        !self.forbidden_shifts.contains(&shift.slot())
    }

    #[inline]
    pub fn prefers(&self, shift: &Shift) -> bool {
        self.preferred_shifts.contains(&shift.slot())
    }

    #[inline]
    pub fn prefers_unit(&self, unit: &str) -> bool {
        self.preferred_units.contains(unit)
    }
}
