//! Cart and wishlist state.
//!
//! DESIGN
//! ======
//! Both models store catalog ids only and resolve items against the catalog
//! on demand, so they serialize to small JSON documents the view layer can
//! persist between sessions.

pub mod cart;
pub mod wishlist;

pub use cart::{Cart, CartLine};
pub use wishlist::Wishlist;

/// Errors produced by cart and wishlist edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopError {
    #[error("unknown catalog item: {0}")]
    UnknownItem(String),
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("item not in cart: {0}")]
    NotInCart(String),
}
