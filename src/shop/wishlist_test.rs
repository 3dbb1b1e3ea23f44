use super::*;
use crate::catalog::catalog;

#[test]
fn add_is_idempotent() {
    let mut wishlist = Wishlist::default();
    assert!(wishlist.add(catalog(), "city-skyline").unwrap());
    assert!(!wishlist.add(catalog(), "city-skyline").unwrap());
    assert_eq!(wishlist.len(), 1);
}

#[test]
fn add_unknown_item_errors() {
    let mut wishlist = Wishlist::default();
    assert_eq!(wishlist.add(catalog(), "ghost").unwrap_err(), ShopError::UnknownItem("ghost".into()));
    assert!(wishlist.is_empty());
}

#[test]
fn remove_reports_presence() {
    let mut wishlist = Wishlist::default();
    wishlist.add(catalog(), "city-skyline").unwrap();
    assert!(wishlist.remove("city-skyline"));
    assert!(!wishlist.remove("city-skyline"));
}

#[test]
fn toggle_flips_membership() {
    let mut wishlist = Wishlist::default();
    assert!(wishlist.toggle(catalog(), "anniversary-rose").unwrap());
    assert!(wishlist.contains("anniversary-rose"));
    assert!(!wishlist.toggle(catalog(), "anniversary-rose").unwrap());
    assert!(!wishlist.contains("anniversary-rose"));
}

#[test]
fn resolve_keeps_order_and_skips_retired_items() {
    let wishlist = Wishlist {
        item_ids: vec!["unicorn-dream".into(), "retired".into(), "black-forest".into()],
    };
    let names: Vec<_> = wishlist.resolve(catalog()).map(|item| item.id).collect();
    assert_eq!(names, vec!["unicorn-dream", "black-forest"]);
}
