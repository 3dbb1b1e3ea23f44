//! Plain-text screens. Every function returns the rendered text so the
//! output can be checked without capturing stdout.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write;

use cakeshop::auth::{UserProfile, ValidationErrors};
use cakeshop::catalog::{CATEGORY_FILTERS, CakeItem, format_cents};
use cakeshop::shop::{Cart, Wishlist};

pub const NO_MATCHES: &str = "No cakes match your search.";
pub const EMPTY_CART: &str = "Your cart is empty.";
pub const EMPTY_WISHLIST: &str = "Your wishlist is empty.";

/// Gallery rows; wishlisted items are marked with `*`.
pub fn gallery(items: &[&CakeItem], wishlist: &Wishlist) -> String {
    if items.is_empty() {
        return NO_MATCHES.to_owned();
    }
    let mut out = String::new();
    for item in items {
        let mark = if wishlist.contains(item.id) { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{mark} {:<22} {:<26} {:>8}  {}",
            item.id,
            item.name,
            item.display_price(),
            item.categories.join(", ")
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn categories() -> String {
    CATEGORY_FILTERS
        .iter()
        .map(|filter| format!("{:<14} {}", filter.id, filter.label))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profile(profile: &UserProfile) -> String {
    let mut out = format!("{} <{}>\nid: {}", profile.display_name, profile.email, profile.id);
    if let Some(phone) = &profile.phone {
        let _ = write!(out, "\nphone: {phone}");
    }
    if let Some(avatar) = &profile.avatar_url {
        let _ = write!(out, "\navatar: {avatar}");
    }
    out
}

pub fn cart(cart: &Cart, catalog: &[CakeItem]) -> String {
    if cart.is_empty() {
        return EMPTY_CART.to_owned();
    }
    let mut out = String::new();
    for (item, quantity) in cart.resolve(catalog) {
        let line_total = u64::from(item.price_cents) * u64::from(quantity);
        let _ = writeln!(out, "{quantity:>3} x {:<26} {:>9}", item.name, format_cents(line_total));
    }
    let _ = write!(
        out,
        "{} item(s), total {}",
        cart.item_count(),
        format_cents(cart.total_cents(catalog))
    );
    out
}

pub fn wishlist(wishlist: &Wishlist, catalog: &[CakeItem]) -> String {
    if wishlist.is_empty() {
        return EMPTY_WISHLIST.to_owned();
    }
    wishlist
        .resolve(catalog)
        .map(|item| format!("{:<22} {:<26} {:>8}", item.id, item.name, item.display_price()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per failing field.
pub fn field_errors(errors: &ValidationErrors) -> String {
    errors
        .errors
        .iter()
        .map(|e| format!("  {}: {}", e.field.as_str(), e.message))
        .collect::<Vec<_>>()
        .join("\n")
}
