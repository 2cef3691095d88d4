//! Monthly shift catalog.
//!
//! Generates the shift list for one month across a set of units. Every
//! unit gets a Day and a Night shift per day, tagged with the weekday,
//! `Weekend` (Saturday/Sunday) and `PublicHoliday` where listed.
//!
//! Monday–Friday Day shifts are normally covered by regular staff, so they
//! are left out unless the day is a public holiday or weekday day shifts
//! are explicitly included.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use thiserror::Error;

use super::{RotaSnapshot, Shift, ShiftKind, ShiftTag};

/// Error produced while generating a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("year {0} is outside 1900-2100")]
    InvalidYear(i32),
    #[error("month {0} is outside 1-12")]
    InvalidMonth(u32),
    #[error("holiday day {day} is outside 1-{days_in_month}")]
    HolidayOutOfRange { day: u32, days_in_month: u32 },
    #[error("no units defined")]
    NoUnits,
}

/// Builder for one month's shifts.
#[derive(Debug, Clone)]
pub struct ShiftCatalog {
    year: i32,
    month: u32,
    units: Vec<String>,
    holidays: BTreeSet<u32>,
    include_weekday_days: bool,
}

impl ShiftCatalog {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            units: Vec::new(),
            holidays: BTreeSet::new(),
            include_weekday_days: false,
        }
    }

    /// Adds a unit (duplicates are ignored).
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        if !self.units.contains(&unit) {
            self.units.push(unit);
        }
        self
    }

    pub fn with_units<I, S>(self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        units.into_iter().fold(self, |cat, u| cat.with_unit(u))
    }

    /// Marks days of the month as public holidays.
    pub fn with_holidays(mut self, days: impl IntoIterator<Item = u32>) -> Self {
        self.holidays.extend(days);
        self
    }

    /// Includes Monday–Friday Day shifts.
    pub fn with_weekday_day_shifts(mut self, include: bool) -> Self {
        self.include_weekday_days = include;
        self
    }

    /// Number of days in the configured month.
    pub fn days_in_month(&self) -> Result<u32, CalendarError> {
        let first = self.first_day()?;
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        }
        .ok_or(CalendarError::InvalidMonth(self.month))?;
        Ok(next.signed_duration_since(first).num_days() as u32)
    }

    fn first_day(&self) -> Result<NaiveDate, CalendarError> {
        if !(1900..=2100).contains(&self.year) {
            return Err(CalendarError::InvalidYear(self.year));
        }
        if !(1..=12).contains(&self.month) {
            return Err(CalendarError::InvalidMonth(self.month));
        }
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or(CalendarError::InvalidMonth(self.month))
    }

    /// Generates a snapshot holding the month's shifts and no workers.
    ///
    /// Shifts are ordered unit by unit, then by day, Day before Night.
    pub fn build(&self) -> Result<RotaSnapshot, CalendarError> {
        if self.units.is_empty() {
            return Err(CalendarError::NoUnits);
        }
        let first = self.first_day()?;
        let days_in_month = self.days_in_month()?;
        if let Some(&day) = self
            .holidays
            .iter()
            .find(|&&d| d == 0 || d > days_in_month)
        {
            return Err(CalendarError::HolidayOutOfRange { day, days_in_month });
        }

        let mut snapshot = RotaSnapshot::new(days_in_month);
        for unit in &self.units {
            for day in 1..=days_in_month {
                let weekday = first
                    .with_day(day)
                    .ok_or(CalendarError::InvalidMonth(self.month))?
                    .weekday();
                let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
                let holiday = self.holidays.contains(&day);

                for kind in ShiftKind::ALL {
                    if kind == ShiftKind::Day && !weekend && !holiday && !self.include_weekday_days
                    {
                        continue;
                    }
                    let mut shift = Shift::new(kind, day, unit.clone())
                        .with_tag(ShiftTag::Weekday(weekday));
                    if weekend {
                        shift = shift.with_tag(ShiftTag::Weekend);
                    }
                    if holiday {
                        shift = shift.with_tag(ShiftTag::PublicHoliday);
                    }
                    snapshot.shifts.push(shift);
                }
            }
        }
        Ok(snapshot)
    }
}
