//! Static cake catalog.
//!
//! DESIGN
//! ======
//! The catalog is compiled in and never mutated, so items borrow `'static`
//! strings and callers pass `&[CakeItem]` around freely. Filtering lives in
//! [`filter`] and never allocates new items.

mod data;
pub mod filter;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use serde::Serialize;

pub use filter::{category_from_query, filter_catalog, matches_category, matches_search};

/// Category selector that matches every item.
pub const ALL_CATEGORIES: &str = "all";

/// A single cake in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CakeItem {
    /// Stable catalog identifier (used by cart and wishlist).
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// One or more category tags, e.g. `"chocolate"`, `"birthday"`.
    pub categories: &'static [&'static str],
    /// Price in cents.
    pub price_cents: u32,
    /// Image path relative to the storefront asset root.
    pub image: &'static str,
}

impl CakeItem {
    /// Whether the item carries the exact category tag.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(&category)
    }

    /// Price formatted for display, e.g. `"$42.50"`.
    #[must_use]
    pub fn display_price(&self) -> String {
        format_cents(u64::from(self.price_cents))
    }
}

/// A selectable gallery filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryFilter {
    pub id: &'static str,
    pub label: &'static str,
}

/// Filters offered by the gallery, in display order.
pub const CATEGORY_FILTERS: &[CategoryFilter] = &[
    CategoryFilter { id: ALL_CATEGORIES, label: "All Cakes" },
    CategoryFilter { id: "chocolate", label: "Chocolate" },
    CategoryFilter { id: "fruit", label: "Fruit" },
    CategoryFilter { id: "vanilla", label: "Vanilla" },
    CategoryFilter { id: "birthday", label: "Birthday" },
    CategoryFilter { id: "wedding", label: "Wedding" },
    CategoryFilter { id: "cupcakes", label: "Cupcakes" },
    CategoryFilter { id: "metropolitan", label: "Metropolitan" },
    CategoryFilter { id: "themed", label: "Themed" },
    CategoryFilter { id: "gift", label: "Gift" },
    CategoryFilter { id: "celebration", label: "Celebration" },
];

/// The full storefront catalog in display order.
#[must_use]
pub fn catalog() -> &'static [CakeItem] {
    data::CAKES
}

/// Look up an item by id in `items`.
#[must_use]
pub fn find_item<'a>(items: &'a [CakeItem], id: &str) -> Option<&'a CakeItem> {
    items.iter().find(|item| item.id == id)
}

/// Format an amount in cents as dollars.
#[must_use]
pub fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
