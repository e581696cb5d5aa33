//! Free-text search over course name and world.

use crate::record::Record;

/// Returns true if `record` matches an already-lowercased query.
fn matches_lowered(record: &Record, lowered: &str) -> bool {
    record.name.to_lowercase().contains(lowered) || record.world.to_lowercase().contains(lowered)
}

/// Returns true if `record` matches `query`.
///
/// Case-insensitive substring match on `name` or `world`. The empty query
/// matches everything.
#[must_use]
pub fn matches(record: &Record, query: &str) -> bool {
    query.is_empty() || matches_lowered(record, &query.to_lowercase())
}

/// Reduce `records` to those matching `query`, preserving input order.
///
/// The query is used verbatim (not trimmed); only case is folded.
#[must_use]
pub fn filter_records<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    if query.is_empty() {
        return records.iter().collect();
    }

    let lowered = query.to_lowercase();
    records
        .iter()
        .filter(|record| matches_lowered(record, &lowered))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("Alpe du Zwift", "Watopia", 12.2, 1036.0, 1000),
            Record::new("Greater London Loop", "London", 24.0, 255.0, 480),
            Record::new("Volcano Circuit", "Watopia", 4.1, 20.0, 80),
            Record::new("Richmond UCI Worlds", "Richmond", 16.2, 150.0, 320),
        ]
    }

    #[test]
    fn empty_query_is_identity() {
        let records = sample();
        let out = filter_records(&records, "");
        assert_eq!(out.len(), records.len());
        for (got, want) in out.iter().zip(records.iter()) {
            assert!(std::ptr::eq(*got, want));
        }
    }

    #[test]
    fn query_is_case_insensitive() {
        let records = vec![Record::new("Alpe du Zwift", "Watopia", 12.2, 1036.0, 1000)];
        let out = filter_records(&records, "ALPE");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn query_matches_world() {
        let records = sample();
        let out = filter_records(&records, "watopia");
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Alpe du Zwift", "Volcano Circuit"]);
    }

    #[test]
    fn query_matches_substring_inside_name() {
        let records = sample();
        let out = filter_records(&records, "don lo");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Greater London Loop");
    }

    #[test]
    fn filtering_preserves_input_order() {
        let records = sample();
        let out = filter_records(&records, "o");
        let positions: Vec<usize> = out
            .iter()
            .map(|r| records.iter().position(|x| x.name == r.name).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn no_match_yields_empty() {
        let records = sample();
        assert!(filter_records(&records, "yorkshire").is_empty());
    }

    #[test]
    fn whitespace_query_is_literal() {
        let records = vec![Record::new("Tick Tock", "Watopia", 19.0, 59.0, 400)];
        assert_eq!(filter_records(&records, " ").len(), 1);
        assert!(filter_records(&records, "  ").is_empty());
    }

    #[test]
    fn matches_agrees_with_filter() {
        let records = sample();
        for r in &records {
            assert_eq!(matches(r, "LONDON"), r.name.contains("London") || r.world == "London");
        }
    }
}
