//! Shift model.
//!
//! A shift is one unit/day/type work slot, covered by at most one worker.
//! Its identity is the triple (type, day, unit), serialized as
//! `"<Type> <day> <unit>"` (e.g. `"Night 12 Internal Medicine"`).
//!
//! Worker preferences and prohibitions refer to shifts by the shorter
//! type+day token ([`ShiftSlot`], e.g. `"Day 5"`), which matches that
//! slot in every unit.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error produced when parsing a shift identity or slot token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The leading word is neither `Day` nor `Night`.
    #[error("unknown shift type '{0}'")]
    UnknownKind(String),
    /// The day number is missing or not a positive integer.
    #[error("invalid day number in '{0}'")]
    InvalidDay(String),
    /// A full shift identity was expected but no unit followed the day.
    #[error("missing unit in '{0}'")]
    MissingUnit(String),
    /// A slot token had trailing text after the day number.
    #[error("unexpected trailing text in '{0}'")]
    Trailing(String),
}

/// Shift type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftKind {
    /// Daytime shift.
    Day,
    /// Overnight shift.
    Night,
}

impl ShiftKind {
    /// Both kinds, in generation order.
    pub const ALL: [ShiftKind; 2] = [ShiftKind::Day, ShiftKind::Night];

    /// The other kind (Day ↔ Night).
    pub fn complement(self) -> Self {
        match self {
            ShiftKind::Day => ShiftKind::Night,
            ShiftKind::Night => ShiftKind::Day,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftKind::Day => "Day",
            ShiftKind::Night => "Night",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Day" => Ok(ShiftKind::Day),
            "Night" => Ok(ShiftKind::Night),
            other => Err(ParseError::UnknownKind(other.to_string())),
        }
    }
}

/// Type+day token (`"Day 5"`), independent of unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ShiftSlot {
    /// Day of month (1-based). Declared first so slots order chronologically.
    pub day: u32,
    /// Shift type.
    pub kind: ShiftKind,
}

impl ShiftSlot {
    pub fn new(kind: ShiftKind, day: u32) -> Self {
        Self { day, kind }
    }

    pub fn day(day: u32) -> Self {
        Self::new(ShiftKind::Day, day)
    }

    pub fn night(day: u32) -> Self {
        Self::new(ShiftKind::Night, day)
    }
}

impl fmt::Display for ShiftSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.day)
    }
}

fn split_kind_day(s: &str) -> Result<(ShiftKind, u32, Option<&str>), ParseError> {
    let mut parts = s.trim().splitn(3, ' ');
    let kind = parts.next().unwrap_or_default().parse::<ShiftKind>()?;
    let day = parts
        .next()
        .and_then(|d| d.parse::<u32>().ok())
        .filter(|&d| d > 0)
        .ok_or_else(|| ParseError::InvalidDay(s.to_string()))?;
    let rest = parts.next().map(str::trim).filter(|r| !r.is_empty());
    Ok((kind, day, rest))
}

impl FromStr for ShiftSlot {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_kind_day(s)? {
            (kind, day, None) => Ok(Self::new(kind, day)),
            (_, _, Some(_)) => Err(ParseError::Trailing(s.to_string())),
        }
    }
}

impl TryFrom<String> for ShiftSlot {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShiftSlot> for String {
    fn from(slot: ShiftSlot) -> Self {
        slot.to_string()
    }
}

/// Shift identity: type, day, and unit.
///
/// Ordered by day, then type (Day before Night), then unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ShiftId {
    pub day: u32,
    pub kind: ShiftKind,
    pub unit: String,
}

impl ShiftId {
    pub fn new(kind: ShiftKind, day: u32, unit: impl Into<String>) -> Self {
        Self {
            day,
            kind,
            unit: unit.into(),
        }
    }

    /// The unit-independent type+day token.
    #[inline]
    pub fn slot(&self) -> ShiftSlot {
        ShiftSlot::new(self.kind, self.day)
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.day, self.unit)
    }
}

impl FromStr for ShiftId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_kind_day(s)? {
            (kind, day, Some(unit)) => Ok(Self::new(kind, day, unit)),
            (_, _, None) => Err(ParseError::MissingUnit(s.to_string())),
        }
    }
}

impl TryFrom<String> for ShiftId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShiftId> for String {
    fn from(id: ShiftId) -> Self {
        id.to_string()
    }
}

/// Calendar tag derived for a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftTag {
    /// Day of the week the shift falls on.
    Weekday(Weekday),
    /// Saturday or Sunday.
    Weekend,
    /// Listed public holiday.
    PublicHoliday,
}

impl fmt::Display for ShiftTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftTag::Weekday(w) => {
                let name = match w {
                    Weekday::Mon => "Monday",
                    Weekday::Tue => "Tuesday",
                    Weekday::Wed => "Wednesday",
                    Weekday::Thu => "Thursday",
                    Weekday::Fri => "Friday",
                    Weekday::Sat => "Saturday",
                    Weekday::Sun => "Sunday",
                };
                f.write_str(name)
            }
            ShiftTag::Weekend => f.write_str("Weekend"),
            ShiftTag::PublicHoliday => f.write_str("Public holiday"),
        }
    }
}

/// A shift to be covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identity within a snapshot.
    pub id: ShiftId,
    /// Calendar tags (weekday, weekend, holiday).
    #[serde(default)]
    pub tags: Vec<ShiftTag>,
    /// Worker fixed to this shift before the engine runs.
    #[serde(default)]
    pub assigned_worker: Option<String>,
}

impl Shift {
    /// Creates an untagged, unassigned shift.
    pub fn new(kind: ShiftKind, day: u32, unit: impl Into<String>) -> Self {
        Self {
            id: ShiftId::new(kind, day, unit),
            tags: Vec::new(),
            assigned_worker: None,
        }
    }

    pub fn day(day: u32, unit: impl Into<String>) -> Self {
        Self::new(ShiftKind::Day, day, unit)
    }

    pub fn night(day: u32, unit: impl Into<String>) -> Self {
        Self::new(ShiftKind::Night, day, unit)
    }

    /// Adds a tag (duplicates are ignored).
    pub fn with_tag(mut self, tag: ShiftTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Fixes the shift to a worker.
    pub fn assigned_to(mut self, worker: impl Into<String>) -> Self {
        self.assigned_worker = Some(worker.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ShiftKind {
        self.id.kind
    }

    #[inline]
    pub fn day_of_month(&self) -> u32 {
        self.id.day
    }

    #[inline]
    pub fn unit(&self) -> &str {
        &self.id.unit
    }

    #[inline]
    pub fn slot(&self) -> ShiftSlot {
        self.id.slot()
    }

    /// Whether the shift still needs a worker.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assigned_worker.is_none()
    }

    pub fn is_weekend(&self) -> bool {
        self.tags.contains(&ShiftTag::Weekend)
    }

    pub fn is_public_holiday(&self) -> bool {
        self.tags.contains(&ShiftTag::PublicHoliday)
    }
}
