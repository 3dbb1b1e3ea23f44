//! # cakeshop
//!
//! Client-side state layer for the custom-cake storefront.
//!
//! ARCHITECTURE
//! ============
//! - `catalog`: static cake list and the pure gallery filter.
//! - `shop`: cart and wishlist models persisted by the view layer.
//! - `auth`: validation, the remote identity gateway (live + fake), and the
//!   `AuthStore` that caches the signed-in profile.
//! - `config`: environment-driven backend selection.
//!
//! The hosted identity service owns sessions; everything here mirrors its
//! responses.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod shop;
