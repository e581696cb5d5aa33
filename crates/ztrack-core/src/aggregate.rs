//! Progress totals over a record subset.
//!
//! Only raw counts and sums are stored. [`ratio`] leaves an empty
//! denominator as `None` for whoever renders it to decide.

use serde::Serialize;

use crate::record::Record;
use crate::selection::SelectionSet;

/// Counts and XP sums for one subset of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    /// Records in the subset.
    pub total_count: usize,
    /// Records in the subset that are selected.
    pub selected_count: usize,
    /// XP across the subset.
    pub xp_total: u64,
    /// XP across selected records of the subset.
    pub xp_earned: u64,
}

impl Totals {
    /// Aggregate `rows` against `selection`.
    ///
    /// Selected ids that do not appear in `rows` contribute nothing, so
    /// `selected_count <= total_count` and `xp_earned <= xp_total` hold for
    /// any input.
    pub fn compute<'a, I>(rows: I, selection: &SelectionSet) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        rows.into_iter().fold(Self::default(), |mut acc, record| {
            let xp = u64::from(record.xp);
            acc.total_count += 1;
            acc.xp_total += xp;
            if selection.contains(record.id()) {
                acc.selected_count += 1;
                acc.xp_earned += xp;
            }
            acc
        })
    }

    /// Fraction of courses completed.
    #[must_use]
    pub fn course_ratio(&self) -> Option<f64> {
        ratio(self.selected_count as u64, self.total_count as u64)
    }

    /// Fraction of available XP earned.
    #[must_use]
    pub fn xp_ratio(&self) -> Option<f64> {
        ratio(self.xp_earned, self.xp_total)
    }
}

/// `part / whole`, or `None` when `whole` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(part: u64, whole: u64) -> Option<f64> {
    (whole != 0).then(|| part as f64 / whole as f64)
}
