//! Saved-for-later items.

#[cfg(test)]
#[path = "wishlist_test.rs"]
mod wishlist_test;

use serde::{Deserialize, Serialize};

use super::ShopError;
use crate::catalog::{CakeItem, find_item};

/// Wishlisted catalog ids, newest last, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    #[serde(default)]
    pub item_ids: Vec<String>,
}

impl Wishlist {
    /// Add an item; returns `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnknownItem`] if the id is not in `catalog`.
    pub fn add(&mut self, catalog: &[CakeItem], item_id: &str) -> Result<bool, ShopError> {
        if find_item(catalog, item_id).is_none() {
            return Err(ShopError::UnknownItem(item_id.to_owned()));
        }
        if self.contains(item_id) {
            return Ok(false);
        }
        self.item_ids.push(item_id.to_owned());
        Ok(true)
    }

    /// Remove an item; returns `false` if it was not present.
    pub fn remove(&mut self, item_id: &str) -> bool {
        let before = self.item_ids.len();
        self.item_ids.retain(|id| id != item_id);
        self.item_ids.len() != before
    }

    /// Flip membership; returns `true` when the item is now wishlisted.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnknownItem`] when adding an id not in `catalog`.
    pub fn toggle(&mut self, catalog: &[CakeItem], item_id: &str) -> Result<bool, ShopError> {
        if self.remove(item_id) {
            return Ok(false);
        }
        self.add(catalog, item_id)
    }

    #[must_use]
    pub fn contains(&self, item_id: &str) -> bool {
        self.item_ids.iter().any(|id| id == item_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }

    /// Wishlisted items still present in the catalog, in wishlist order.
    pub fn resolve<'a>(&'a self, catalog: &'a [CakeItem]) -> impl Iterator<Item = &'a CakeItem> + 'a {
        self.item_ids.iter().filter_map(|id| find_item(catalog, id))
    }
}
