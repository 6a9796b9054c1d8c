//! Listing helpers for opening pickers.

use super::Opening;
use serde::Serialize;
use std::cmp::Ordering;

/// What a picker needs to show for one opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningSummary {
    pub id: String,
    pub name: String,
}

/// Newest first; ties broken by name, case-insensitively.
pub fn sorted(mut openings: Vec<Opening>) -> Vec<Opening> {
    openings.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| compare_names(&a.name, &b.name))
    });
    openings
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Openings whose name contains `term`, ignoring case and surrounding
/// whitespace. A blank term matches everything.
pub fn filter<'a>(openings: &'a [Opening], term: &str) -> Vec<&'a Opening> {
    let needle = term.trim().to_lowercase();
    openings
        .iter()
        .filter(|o| needle.is_empty() || o.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openings::builtin_openings;

    fn named(name: &str, created_at: u64) -> Opening {
        Opening {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            notation: "1. e4".to_string(),
            moves: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_sorted_newest_first_then_name() {
        let openings = sorted(vec![
            named("b line", 10),
            named("Zebra", 20),
            named("A line", 10),
        ]);
        let names: Vec<&str> = openings.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Zebra", "A line", "b line"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_trimmed() {
        let openings = builtin_openings();
        let hits = filter(&openings, "  DEFENSE ");
        let mut names: Vec<&str> = hits.iter().map(|o| o.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["French Defense", "Sicilian Defense"]);

        assert_eq!(filter(&openings, "   ").len(), 3);
        assert_eq!(
            hits[0].summary(),
            OpeningSummary {
                id: hits[0].id.clone(),
                name: hits[0].name.clone(),
            }
        );
        assert!(filter(&openings, "caro").is_empty());
    }
}
