//! Shopping cart.

#[cfg(test)]
#[path = "cart_test.rs"]
mod cart_test;

use serde::{Deserialize, Serialize};

use super::ShopError;
use crate::catalog::{CakeItem, find_item};

/// One cart row: a catalog item and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub quantity: u32,
}

/// Cart contents in first-added order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add `quantity` of an item, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnknownItem`] if the id is not in `catalog`, or
    /// [`ShopError::ZeroQuantity`] for a zero quantity.
    pub fn add(&mut self, catalog: &[CakeItem], item_id: &str, quantity: u32) -> Result<u32, ShopError> {
        if quantity == 0 {
            return Err(ShopError::ZeroQuantity);
        }
        if find_item(catalog, item_id).is_none() {
            return Err(ShopError::UnknownItem(item_id.to_owned()));
        }
        if let Some(line) = self.line_mut(item_id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return Ok(line.quantity);
        }
        self.lines.push(CartLine { item_id: item_id.to_owned(), quantity });
        Ok(quantity)
    }

    /// Replace an existing line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotInCart`] if there is no line for the item.
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> Result<(), ShopError> {
        if quantity == 0 {
            return self.remove(item_id);
        }
        let line = self
            .line_mut(item_id)
            .ok_or_else(|| ShopError::NotInCart(item_id.to_owned()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove an item's line.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotInCart`] if there is no line for the item.
    pub fn remove(&mut self, item_id: &str) -> Result<(), ShopError> {
        let before = self.lines.len();
        self.lines.retain(|line| line.item_id != item_id);
        if self.lines.len() == before {
            return Err(ShopError::NotInCart(item_id.to_owned()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines (the navbar badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of line prices. Lines whose item has left the catalog count as zero.
    #[must_use]
    pub fn total_cents(&self, catalog: &[CakeItem]) -> u64 {
        self.resolve(catalog)
            .map(|(item, quantity)| u64::from(item.price_cents) * u64::from(quantity))
            .sum()
    }

    /// Pair each line with its catalog item, skipping ids the catalog no longer has.
    pub fn resolve<'a>(&'a self, catalog: &'a [CakeItem]) -> impl Iterator<Item = (&'a CakeItem, u32)> + 'a {
        self.lines
            .iter()
            .filter_map(|line| find_item(catalog, &line.item_id).map(|item| (item, line.quantity)))
    }

    fn line_mut(&mut self, item_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.item_id == item_id)
    }
}
