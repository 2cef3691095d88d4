//! Engine settings: objective weights, hard-rule switches, solver limits.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for one engine run.
///
/// Missing keys in a serialized document take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Points per filled shift.
    pub points_filled: i32,
    /// Points per shift on one of the worker's preferred slots.
    pub points_preferred: i32,
    /// Points per shift in one of the worker's preferred units.
    pub points_preferred_unit: i32,
    /// Points per pair of one worker's shifts closer than the threshold
    /// (normally negative).
    pub points_spacing: i32,
    /// Points per 24-hour shift (normally negative).
    pub points_24hr: i32,
    /// Minimum day gap between one worker's shifts that is not penalized.
    pub spacing_days_threshold: u32,
    /// Forbid Night → Night on consecutive days.
    pub enforce_no_adjacent_nights: bool,
    /// Forbid Day → Day on consecutive days.
    pub enforce_no_adjacent_days: bool,
    /// Wall-clock bound handed to the solver.
    pub time_limit_secs: u64,
    /// Omit assignment variables for forbidden (worker, shift) pairs.
    pub prune_forbidden_pairs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            points_filled: 100,
            points_preferred: 1,
            points_preferred_unit: 3,
            points_spacing: -2,
            points_24hr: -3,
            spacing_days_threshold: 4,
            enforce_no_adjacent_nights: true,
            enforce_no_adjacent_days: true,
            time_limit_secs: 60,
            prune_forbidden_pairs: true,
        }
    }
}

impl Settings {
    /// Parses settings from JSON; absent keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    pub fn with_points_filled(mut self, points: i32) -> Self {
        self.points_filled = points;
        self
    }

    pub fn with_points_preferred(mut self, points: i32) -> Self {
        self.points_preferred = points;
        self
    }

    pub fn with_points_preferred_unit(mut self, points: i32) -> Self {
        self.points_preferred_unit = points;
        self
    }

    pub fn with_points_spacing(mut self, points: i32) -> Self {
        self.points_spacing = points;
        self
    }

    pub fn with_points_24hr(mut self, points: i32) -> Self {
        self.points_24hr = points;
        self
    }

    pub fn with_spacing_threshold(mut self, days: u32) -> Self {
        self.spacing_days_threshold = days;
        self
    }

    pub fn with_no_adjacent_nights(mut self, enforce: bool) -> Self {
        self.enforce_no_adjacent_nights = enforce;
        self
    }

    pub fn with_no_adjacent_days(mut self, enforce: bool) -> Self {
        self.enforce_no_adjacent_days = enforce;
        self
    }

    pub fn with_time_limit_secs(mut self, secs: u64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune_forbidden_pairs = prune;
        self
    }
}
