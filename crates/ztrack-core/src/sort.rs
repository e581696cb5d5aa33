//! Comparator builder, stable sort, and the column-click state machine.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{Record, SortKey};

/// Sort direction. Persisted as `"asc"` / `"desc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Accessible description of the direction.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "sorted ascending",
            Self::Desc => "sorted descending",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: Direction,
}

impl SortState {
    #[must_use]
    pub const fn new(key: SortKey, direction: Direction) -> Self {
        Self { key, direction }
    }

    /// Next state after a click on `column`.
    ///
    /// Clicking the active ascending column flips it to descending; any other
    /// click (a new column, or the active descending one) sorts ascending.
    #[must_use]
    pub fn request(self, column: SortKey) -> Self {
        let direction = if self.key == column && self.direction == Direction::Asc {
            Direction::Desc
        } else {
            Direction::Asc
        };
        Self::new(column, direction)
    }

    /// Stable-sort `rows` by this state.
    #[must_use]
    pub fn sort<'a>(self, rows: Vec<&'a Record>) -> Vec<&'a Record> {
        let compare = comparator(self.direction, self.key);
        stable_sort_by(rows, |a, b| compare(*a, *b))
    }
}

/// Higher values first. Absent or incomparable values tie.
fn descending(key: SortKey, a: &Record, b: &Record) -> Ordering {
    match (key.value(a), key.value(b)) {
        (Some(va), Some(vb)) => vb.partial_cmp_value(&va).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Build the ordering function for `direction` on `key`.
///
/// The ascending comparator is the descending one reversed, so the two are
/// exact inverses for every pair, ties included.
pub fn comparator(
    direction: Direction,
    key: SortKey,
) -> impl Fn(&Record, &Record) -> Ordering + Copy {
    move |a: &Record, b: &Record| -> Ordering {
        let ord = descending(key, a, b);
        match direction {
            Direction::Desc => ord,
            Direction::Asc => ord.reverse(),
        }
    }
}

/// Stable merge sort.
///
/// Elements comparing equal keep their input order. Unlike `slice::sort_by`,
/// this never panics when `compare` is not a total order, which happens when
/// records lack the sorted attribute.
pub fn stable_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort(items, &mut compare)
}

fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        // Right wins only when strictly smaller, which keeps ties stable.
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(name: &str, world: &str, xp: u32) -> Record {
        Record::new(name, world, 10.0, 100.0, xp)
    }

    fn names(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn descending_puts_higher_values_first() {
        let a = course("A", "W1", 10);
        let b = course("B", "W2", 20);
        let desc = comparator(Direction::Desc, SortKey::Xp);
        assert_eq!(desc(&a, &b), Ordering::Greater);
        assert_eq!(desc(&b, &a), Ordering::Less);
        assert_eq!(desc(&a, &a), Ordering::Equal);
    }

    #[test]
    fn ascending_is_exact_inverse() {
        let a = course("Alpha", "Watopia", 10);
        let b = course("Beta", "London", 20);
        for key in SortKey::ALL {
            let asc = comparator(Direction::Asc, key);
            let desc = comparator(Direction::Desc, key);
            assert_eq!(asc(&a, &b), desc(&a, &b).reverse(), "key {key}");
            assert_eq!(asc(&b, &a), desc(&b, &a).reverse(), "key {key}");
            assert_eq!(asc(&a, &a), Ordering::Equal);
        }
    }

    #[test]
    fn text_columns_sort_lexicographically() {
        let rows = [
            course("Volcano", "Watopia", 1),
            course("Alpe", "Watopia", 1),
            course("Mighty", "Watopia", 1),
        ];
        let sorted = SortState::new(SortKey::Name, Direction::Asc).sort(rows.iter().collect());
        assert_eq!(names(&sorted), ["Alpe", "Mighty", "Volcano"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let rows = [
            course("first", "W", 50),
            course("second", "W", 10),
            course("third", "W", 50),
            course("fourth", "W", 10),
        ];
        let desc = SortState::new(SortKey::Xp, Direction::Desc).sort(rows.iter().collect());
        assert_eq!(names(&desc), ["first", "third", "second", "fourth"]);

        let asc = SortState::new(SortKey::Xp, Direction::Asc).sort(rows.iter().collect());
        assert_eq!(names(&asc), ["second", "fourth", "first", "third"]);
    }

    #[test]
    fn missing_values_do_not_panic_or_reorder_neighbours() {
        let mut hole = course("hole", "W", 0);
        hole.distance = None;
        let mut short = course("short", "W", 0);
        short.distance = Some(5.0);
        let mut long = course("long", "W", 0);
        long.distance = Some(50.0);

        let rows = vec![&hole, &short, &long];
        let sorted = SortState::new(SortKey::Distance, Direction::Desc).sort(rows);
        // `hole` ties with everything, so it stays ahead of its first merge partner.
        assert_eq!(sorted.len(), 3);
        assert!(sorted.iter().any(|r| r.name == "hole"));
        let long_pos = sorted.iter().position(|r| r.name == "long");
        let short_pos = sorted.iter().position(|r| r.name == "short");
        assert!(long_pos < short_pos);
    }

    #[test]
    fn new_column_click_starts_ascending() {
        let state = SortState::default().request(SortKey::Name);
        assert_eq!(state, SortState::new(SortKey::Name, Direction::Asc));
    }

    #[test]
    fn active_ascending_click_flips_to_descending() {
        let state = SortState::new(SortKey::Distance, Direction::Asc).request(SortKey::Distance);
        assert_eq!(state, SortState::new(SortKey::Distance, Direction::Desc));
    }

    #[test]
    fn active_descending_click_flips_to_ascending() {
        let state = SortState::new(SortKey::Xp, Direction::Desc).request(SortKey::Xp);
        assert_eq!(state, SortState::new(SortKey::Xp, Direction::Asc));
    }

    #[test]
    fn default_state_is_xp_descending() {
        assert_eq!(SortState::default(), SortState::new(SortKey::Xp, Direction::Desc));
    }

    #[test]
    fn stable_sort_handles_empty_and_single() {
        let empty: Vec<u8> = stable_sort_by(Vec::new(), Ord::cmp);
        assert!(empty.is_empty());
        assert_eq!(stable_sort_by(vec![7], Ord::cmp), vec![7]);
    }
}
