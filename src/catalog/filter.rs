//! Gallery search and category filtering.
//!
//! Pure functions recomputed on every input change. An empty result is a
//! normal outcome, not an error.

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;

use super::{ALL_CATEGORIES, CakeItem};

/// Search predicate: empty search matches everything, otherwise the
/// case-insensitive search must be a substring of the name, description, or
/// any category tag.
#[must_use]
pub fn matches_search(item: &CakeItem, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    item.name.to_lowercase().contains(&needle)
        || item.description.to_lowercase().contains(&needle)
        || item
            .categories
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Category predicate: `"all"` matches everything, otherwise the category
/// must be one of the item's tags exactly.
#[must_use]
pub fn matches_category(item: &CakeItem, category: &str) -> bool {
    category == ALL_CATEGORIES || item.has_category(category)
}

/// Items satisfying both predicates, in catalog order.
#[must_use]
pub fn filter_catalog<'a>(items: &'a [CakeItem], search: &str, category: &str) -> Vec<&'a CakeItem> {
    items
        .iter()
        .filter(|item| matches_search(item, search) && matches_category(item, category))
        .collect()
}

/// Resolve the gallery's `?category=` query value; absent or blank means all.
#[must_use]
pub fn category_from_query(raw: Option<&str>) -> &str {
    match raw {
        Some(value) if !value.trim().is_empty() => value,
        _ => ALL_CATEGORIES,
    }
}
