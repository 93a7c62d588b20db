//! Pure derivation of a displayed list from raw items plus filter and
//! sort configuration.
//!
//! Filtering is conjunctive: an item passes only when it satisfies every
//! active dimension. A dimension is inactive at its sentinel value (empty
//! string, `None`, empty set), which each filter type encodes in its
//! `Default`. Sorting is a single-key stable sort; descending mirrors the
//! comparator rather than reversing the sorted list, so equal keys keep
//! insertion order under both directions.

use std::cmp::Ordering;

/// Conjunctive filter configuration for an entity type.
///
/// `Default` must produce the all-inactive configuration; `clear_filters`
/// on a store resets to it.
pub trait FilterSpec<E>: Clone + Default + PartialEq + Send + Sync + 'static {
    fn matches(&self, item: &E) -> bool;
}

/// Single sort key for an entity type.
pub trait SortKey<E>: Copy + Default + PartialEq + Send + Sync + 'static {
    fn compare(&self, a: &E, b: &E) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort configuration: one key plus a direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SortOptions<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K> SortOptions<K> {
    pub fn new(key: K, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn asc(key: K) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    pub fn desc(key: K) -> Self {
        Self::new(key, SortDirection::Desc)
    }
}

/// Case-insensitive string ordering used by every name/title sort key.
pub fn compare_str(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Total ordering over f64 treating NaN as largest.
pub fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| match (a.is_nan(), b.is_nan()) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => Ordering::Equal,
        })
}

/// Case-insensitive string equality shared by category, cuisine, tag
/// and pantry-name matching. Unicode-aware, like [`search_matches`].
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Orders options with `None` after any `Some`, so unset dates sort last
/// in ascending order.
pub fn compare_option<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Derives the displayed list: filter conjunctively, then stable-sort.
pub fn filter_and_sort<E, F, K>(items: &[E], filters: &F, sort: &SortOptions<K>) -> Vec<E>
where
    E: Clone,
    F: FilterSpec<E>,
    K: SortKey<E>,
{
    let mut out: Vec<E> = items
        .iter()
        .filter(|item| filters.matches(item))
        .cloned()
        .collect();
    out.sort_by(|a, b| match sort.direction {
        SortDirection::Asc => sort.key.compare(a, b),
        SortDirection::Desc => sort.key.compare(a, b).reverse(),
    });
    out
}

/// True when a search string matches a haystack, case-insensitively.
/// An empty needle is the inactive sentinel and matches everything.
pub fn search_matches(needle: &str, haystacks: &[&str]) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(&needle))
}

/// True when every selected tag is present on the item.
/// An empty selection is the inactive sentinel.
pub fn tags_match(selected: &[String], item_tags: &[String]) -> bool {
    selected.iter().all(|tag| {
        item_tags
            .iter()
            .any(|t| eq_ignore_case(t, tag))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        rank: i32,
    }

    fn row(name: &str, rank: i32) -> Row {
        Row {
            name: name.into(),
            rank,
        }
    }

    #[derive(Clone, Default, PartialEq)]
    struct RankFilter {
        min_rank: Option<i32>,
    }

    impl FilterSpec<Row> for RankFilter {
        fn matches(&self, item: &Row) -> bool {
            match self.min_rank {
                Some(min) => item.rank >= min,
                None => true,
            }
        }
    }

    #[derive(Clone, Copy, Default, PartialEq)]
    struct ByName;

    impl SortKey<Row> for ByName {
        fn compare(&self, a: &Row, b: &Row) -> Ordering {
            compare_str(&a.name, &b.name)
        }
    }

    #[test]
    fn test_filter_is_subset() {
        let items = vec![row("a", 1), row("b", 5), row("c", 3)];
        let filters = RankFilter { min_rank: Some(3) };
        let out = filter_and_sort(&items, &filters, &SortOptions::asc(ByName));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.rank >= 3));
    }

    #[test]
    fn test_inactive_filter_passes_everything() {
        let items = vec![row("a", 1), row("b", 5)];
        let out = filter_and_sort(&items, &RankFilter::default(), &SortOptions::asc(ByName));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_sort_ascending_case_insensitive() {
        let items = vec![row("Banana", 0), row("apple", 0), row("Cherry", 0)];
        let out = filter_and_sort(&items, &RankFilter::default(), &SortOptions::asc(ByName));
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["apple", "Banana", "Cherry"]);
    }

    #[test]
    fn test_descending_is_stable_not_reversed() {
        // Two rows share the key "b"; ranks distinguish insertion order.
        let items = vec![row("b", 1), row("a", 2), row("b", 3)];

        let asc = filter_and_sort(&items, &RankFilter::default(), &SortOptions::asc(ByName));
        let asc_ranks: Vec<i32> = asc.iter().map(|r| r.rank).collect();
        assert_eq!(asc_ranks, [2, 1, 3]);

        // Mirrored comparator over a stable sort: equal keys keep
        // insertion order, so this is not the reverse of `asc`.
        let desc = filter_and_sort(&items, &RankFilter::default(), &SortOptions::desc(ByName));
        let desc_ranks: Vec<i32> = desc.iter().map(|r| r.rank).collect();
        assert_eq!(desc_ranks, [1, 3, 2]);
    }

    #[test]
    fn test_search_matches() {
        assert!(search_matches("", &["anything"]));
        assert!(search_matches("TOM", &["Roma Tomato"]));
        assert!(!search_matches("basil", &["Roma Tomato", "produce"]));
    }

    #[test]
    fn test_tags_match_requires_all_selected() {
        let item_tags = vec!["Organic".to_string(), "local".to_string()];
        assert!(tags_match(&[], &item_tags));
        assert!(tags_match(&["organic".to_string()], &item_tags));
        assert!(!tags_match(
            &["organic".to_string(), "frozen".to_string()],
            &item_tags
        ));
    }

    #[test]
    fn test_compare_f64_nan_sorts_last() {
        assert_eq!(compare_f64(1.0, 2.0), Ordering::Less);
        assert_eq!(compare_f64(f64::NAN, 1.0), Ordering::Greater);
        assert_eq!(compare_f64(1.0, f64::NAN), Ordering::Less);
        assert_eq!(compare_f64(f64::NAN, f64::NAN), Ordering::Equal);
    }

    #[test]
    fn test_eq_ignore_case_is_unicode_aware() {
        assert!(eq_ignore_case("Jalapeño", "JALAPEÑO"));
        assert!(eq_ignore_case("organic", "Organic"));
        assert!(!eq_ignore_case("organic", "frozen"));
    }

    #[test]
    fn test_tags_match_non_ascii() {
        let item_tags = vec!["Jalapeño".to_string()];
        assert!(tags_match(&["jalapeño".to_string()], &item_tags));
    }

    #[test]
    fn test_compare_option_none_last() {
        assert_eq!(compare_option(&Some(1), &None), Ordering::Less);
        assert_eq!(compare_option::<i32>(&None, &Some(1)), Ordering::Greater);
        assert_eq!(compare_option::<i32>(&None, &None), Ordering::Equal);
    }
}
