//! Achievement records and typed column access.
//!
//! A [`Record`] is one course entry. Columns are addressed through
//! [`SortKey`], which dispatches to a typed accessor instead of looking
//! attributes up by name at runtime.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackError;

/// One achievement/course entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier within a dataset.
    pub name: String,
    #[serde(default)]
    pub world: String,
    /// Kilometers.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Meters.
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub xp: u32,
}

impl Record {
    /// Construct a fully-populated record.
    pub fn new(
        name: impl Into<String>,
        world: impl Into<String>,
        distance: f64,
        elevation: f64,
        xp: u32,
    ) -> Self {
        Self {
            name: name.into(),
            world: world.into(),
            distance: Some(distance),
            elevation: Some(elevation),
            xp,
        }
    }

    /// The identifier used by the selection set.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.name
    }
}

/// A borrowed column value with its natural ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl FieldValue<'_> {
    /// Natural ordering of two values of the same column.
    ///
    /// Returns `None` when the values are not comparable (NaN, or mismatched
    /// kinds), which callers treat as a tie.
    #[must_use]
    pub fn partial_cmp_value(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Sortable record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    World,
    Distance,
    Elevation,
    #[default]
    Xp,
}

impl SortKey {
    /// Every column, in display order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::World,
        Self::Distance,
        Self::Elevation,
        Self::Xp,
    ];

    /// Persisted and command-line spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::World => "world",
            Self::Distance => "distance",
            Self::Elevation => "elevation",
            Self::Xp => "xp",
        }
    }

    /// Column header text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Course",
            Self::World => "World",
            Self::Distance => "Distance",
            Self::Elevation => "Elevation",
            Self::Xp => "XP",
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Distance | Self::Elevation | Self::Xp)
    }

    /// Typed accessor for this column. `None` means the record lacks a value.
    #[must_use]
    pub fn value(self, record: &Record) -> Option<FieldValue<'_>> {
        match self {
            Self::Name => Some(FieldValue::Text(&record.name)),
            Self::World => Some(FieldValue::Text(&record.world)),
            Self::Distance => record.distance.map(FieldValue::Number),
            Self::Elevation => record.elevation.map(FieldValue::Number),
            Self::Xp => Some(FieldValue::Number(f64::from(record.xp))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == lowered)
            .ok_or_else(|| TrackError::UnknownSortKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_round_trips_through_str() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().ok(), Some(key));
        }
        assert_eq!("XP".parse::<SortKey>().ok(), Some(SortKey::Xp));
    }

    #[test]
    fn unknown_sort_key_fails_fast() {
        let err = "speed".parse::<SortKey>().unwrap_err();
        assert!(matches!(err, TrackError::UnknownSortKey(ref k) if k == "speed"));
    }

    #[test]
    fn accessor_dispatches_by_column() {
        let r = Record::new("Alpe du Zwift", "Watopia", 12.2, 1036.0, 1000);
        assert_eq!(SortKey::Name.value(&r), Some(FieldValue::Text("Alpe du Zwift")));
        assert_eq!(SortKey::World.value(&r), Some(FieldValue::Text("Watopia")));
        assert_eq!(SortKey::Distance.value(&r), Some(FieldValue::Number(12.2)));
        assert_eq!(SortKey::Elevation.value(&r), Some(FieldValue::Number(1036.0)));
        assert_eq!(SortKey::Xp.value(&r), Some(FieldValue::Number(1000.0)));
    }

    #[test]
    fn missing_measurement_has_no_value() {
        let mut r = Record::new("Volcano Flat", "Watopia", 12.3, 25.0, 240);
        r.elevation = None;
        assert_eq!(SortKey::Elevation.value(&r), None);
    }

    #[test]
    fn record_deserializes_with_defaults() {
        let r: Record = serde_json::from_str(r#"{"name":"Tempus Fugit"}"#).unwrap();
        assert_eq!(r.name, "Tempus Fugit");
        assert_eq!(r.world, "");
        assert_eq!(r.distance, None);
        assert_eq!(r.xp, 0);
    }

    #[test]
    fn sort_key_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SortKey::Elevation).unwrap(), "\"elevation\"");
        let k: SortKey = serde_json::from_str("\"xp\"").unwrap();
        assert_eq!(k, SortKey::Xp);
    }

    #[test]
    fn nan_is_not_comparable() {
        let a = FieldValue::Number(f64::NAN);
        let b = FieldValue::Number(1.0);
        assert_eq!(a.partial_cmp_value(&b), None);
    }
}
