//! Pair generation.
//!
//! Derives the relationships between empty shifts that the model needs:
//! consecutive-day adjacency, same-day conflicts, 24-hour pairs, and
//! spacing pairs. Pairs hold positions into the empty-shift slice the
//! generator was given.
//!
//! [`AnchorLinks`] gives the same relationships between one pre-assigned
//! shift and the empty shifts, so fixed history constrains its worker the
//! way a solver-chosen shift would.

use std::collections::BTreeMap;

use crate::models::{Shift, ShiftId, ShiftKind};

/// Relationships among empty shifts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftPairs {
    /// `(night on d, day on d+1)`, any units.
    pub night_to_day: Vec<(usize, usize)>,
    /// `(night on d, night on d+1)`, any units.
    pub adjacent_nights: Vec<(usize, usize)>,
    /// `(day on d, day on d+1)`, any units.
    pub adjacent_days: Vec<(usize, usize)>,
    /// `(day, night)` on one day in one unit.
    pub twenty_four: Vec<(usize, usize)>,
    /// Any other two shifts on one day.
    pub same_day_conflicts: Vec<(usize, usize)>,
    /// Shifts on different days with a gap below the threshold,
    /// earlier shift first.
    pub spacing: Vec<(usize, usize)>,
}

impl ShiftPairs {
    /// Generates every pair set for `empty`.
    pub fn generate(empty: &[&Shift], spacing_threshold: u32) -> Self {
        let mut pairs = Self::default();

        let mut by_day: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, shift) in empty.iter().enumerate() {
            by_day.entry(shift.day_of_month()).or_default().push(i);
        }

        for (&day, today) in &by_day {
            for (k, &a) in today.iter().enumerate() {
                for &b in &today[k + 1..] {
                    pairs.classify_same_day(empty, a, b);
                }
            }

            let Some(tomorrow) = by_day.get(&(day + 1)) else {
                continue;
            };
            for &a in today {
                for &b in tomorrow {
                    match (empty[a].kind(), empty[b].kind()) {
                        (ShiftKind::Night, ShiftKind::Day) => pairs.night_to_day.push((a, b)),
                        (ShiftKind::Night, ShiftKind::Night) => {
                            pairs.adjacent_nights.push((a, b))
                        }
                        (ShiftKind::Day, ShiftKind::Day) => pairs.adjacent_days.push((a, b)),
                        (ShiftKind::Day, ShiftKind::Night) => {}
                    }
                }
            }
        }

        pairs.spacing = spacing_pairs(empty, spacing_threshold);
        pairs
    }

    fn classify_same_day(&mut self, empty: &[&Shift], a: usize, b: usize) {
        let (sa, sb) = (empty[a], empty[b]);
        if sa.unit() == sb.unit() && sa.kind() != sb.kind() {
            if sa.kind() == ShiftKind::Day {
                self.twenty_four.push((a, b));
            } else {
                self.twenty_four.push((b, a));
            }
        } else {
            self.same_day_conflicts.push((a, b));
        }
    }

    /// Total number of pairs across all sets.
    pub fn len(&self) -> usize {
        self.night_to_day.len()
            + self.adjacent_nights.len()
            + self.adjacent_days.len()
            + self.twenty_four.len()
            + self.same_day_conflicts.len()
            + self.spacing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sorted scan: the inner loop stops at the first shift whose gap reaches
/// the threshold, since every later shift is farther away.
fn spacing_pairs(empty: &[&Shift], threshold: u32) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..empty.len()).collect();
    order.sort_by_key(|&i| (empty[i].day_of_month(), i));

    let mut pairs = Vec::new();
    for (k, &a) in order.iter().enumerate() {
        let day_a = empty[a].day_of_month();
        for &b in &order[k + 1..] {
            let gap = empty[b].day_of_month() - day_a;
            if gap >= threshold {
                break;
            }
            if gap > 0 {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

/// Relationships between one pre-assigned shift and the empty shifts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorLinks {
    /// Empty shifts forming a Night → Day sequence with the anchor, in
    /// either order.
    pub night_to_day: Vec<usize>,
    /// Empty nights on the day before or after an anchoring night.
    pub adjacent_nights: Vec<usize>,
    /// Empty days on the day before or after an anchoring day.
    pub adjacent_days: Vec<usize>,
    /// Empty shifts on the anchor's day other than its complement.
    pub same_day: Vec<usize>,
    /// The opposite half of the anchor's 24-hour pair, if empty.
    pub complement: Option<usize>,
    /// Empty shifts on other days within the spacing threshold.
    pub spacing: Vec<usize>,
}

impl AnchorLinks {
    pub fn generate(anchor: &ShiftId, empty: &[&Shift], spacing_threshold: u32) -> Self {
        let mut links = Self::default();

        for (i, shift) in empty.iter().enumerate() {
            let other = &shift.id;
            let gap = anchor.day.abs_diff(other.day);

            if gap == 0 {
                if other.unit == anchor.unit && other.kind == anchor.kind.complement() {
                    links.complement = Some(i);
                } else {
                    links.same_day.push(i);
                }
                continue;
            }

            if gap < spacing_threshold {
                links.spacing.push(i);
            }
            if gap != 1 {
                continue;
            }

            let (first, second) = if anchor.day < other.day {
                (anchor.kind, other.kind)
            } else {
                (other.kind, anchor.kind)
            };
            match (first, second) {
                (ShiftKind::Night, ShiftKind::Day) => links.night_to_day.push(i),
                (ShiftKind::Night, ShiftKind::Night) => links.adjacent_nights.push(i),
                (ShiftKind::Day, ShiftKind::Day) => links.adjacent_days.push(i),
                (ShiftKind::Day, ShiftKind::Night) => {}
            }
        }

        links
    }
}
