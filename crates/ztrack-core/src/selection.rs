use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Set of selected (claimed) record identifiers.
///
/// Uniqueness is structural. Values are treated as immutable: [`toggle`]
/// returns a new set so callers can detect changes by comparison.
///
/// Persisted as a JSON array of names in sorted order, so the stored form is
/// deterministic regardless of hash iteration order.
///
/// [`toggle`]: SelectionSet::toggle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    /// Create a new empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Return a copy with `id` removed if present, or added if absent.
    ///
    /// `id` does not have to name a currently visible record.
    #[must_use]
    pub fn toggle(&self, id: &str) -> Self {
        let mut ids = self.ids.clone();
        if !ids.remove(id) {
            ids.insert(id.to_string());
        }
        Self { ids }
    }

    /// Number of selected ids, visible or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in sorted order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

impl From<Vec<String>> for SelectionSet {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<SelectionSet> for Vec<String> {
    fn from(set: SelectionSet) -> Self {
        set.to_sorted_vec()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_absent_id() {
        let set = SelectionSet::new();
        let next = set.toggle("Alpe du Zwift");
        assert!(next.contains("Alpe du Zwift"));
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn toggle_does_not_mutate_input() {
        let set = SelectionSet::new();
        let _ = set.toggle("Alpe du Zwift");
        assert!(set.is_empty());
    }

    #[test]
    fn toggle_removes_present_id() {
        let set: SelectionSet = ["a", "b", "c"].into_iter().collect();
        let next = set.toggle("b");
        assert!(!next.contains("b"));
        assert_eq!(next.to_sorted_vec(), ["a", "c"]);
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let set: SelectionSet = ["a", "b"].into_iter().collect();
        assert_eq!(set.toggle("z").toggle("z"), set);
        assert_eq!(set.toggle("a").toggle("a"), set);
    }

    #[test]
    fn duplicates_collapse_on_load() {
        let set: SelectionSet =
            serde_json::from_str(r#"["Volcano Climb", "Volcano Climb", "Tempus Fugit"]"#).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serializes_as_sorted_array() {
        let set: SelectionSet = ["zeta", "alpha", "mu"].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["alpha","mu","zeta"]"#
        );
    }

    #[test]
    fn changed_set_compares_unequal() {
        let set = SelectionSet::new();
        assert_ne!(set.toggle("x"), set);
    }
}
