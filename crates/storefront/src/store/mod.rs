//! Session-scoped cart persistence.
//!
//! # Architecture
//!
//! - [`SessionStorage`] is a synchronous string key/value store, the same
//!   shape as browser session storage
//! - [`CartStore`] maps a restaurant's cart onto the `cartItems:<restaurantId>`
//!   key as a JSON array of `{_id, name, price, quantity}`
//! - [`MemoryStorage`] is the in-memory implementation, used as a test fake
//!   and as the per-request working copy of a `tower-sessions` session
//! - [`session`] moves entries between a working copy and the real session
//!
//! The store is a mirror, not a source of truth: the in-memory cart always
//! wins and is what gets written back. Malformed stored data is logged and
//! treated as "no cart".

mod memory;
pub mod session;

pub use memory::MemoryStorage;

use plateful_core::{Cart, CartError, CartLine, RestaurantId};
use thiserror::Error;
use tracing::warn;

/// Prefix for per-restaurant cart keys.
pub const CART_KEY_PREFIX: &str = "cartItems:";

/// The storage key holding `restaurant_id`'s cart.
#[must_use]
pub fn cart_key(restaurant_id: &RestaurantId) -> String {
    format!("{CART_KEY_PREFIX}{restaurant_id}")
}

/// A string-valued key/value store scoped to one browser session.
pub trait SessionStorage {
    /// Read the raw value at `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Overwrite the value at `key`.
    fn set_item(&mut self, key: &str, value: String);

    /// Delete `key`. Removing a missing key is a no-op.
    fn remove_item(&mut self, key: &str);
}

/// Errors decoding a stored cart.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored value is not a JSON array of cart lines.
    #[error("stored cart is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The lines decoded but break a cart invariant.
    #[error("stored cart is inconsistent: {0}")]
    Invalid(#[from] CartError),
}

/// Reads and writes whole carts through a [`SessionStorage`].
#[derive(Debug, Default)]
pub struct CartStore<S> {
    storage: S,
}

impl<S: SessionStorage> CartStore<S> {
    /// Wrap a storage backend.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load `restaurant_id`'s cart.
    ///
    /// Returns an empty cart when nothing is stored or the stored value is
    /// malformed; never fails.
    pub fn load(&self, restaurant_id: &RestaurantId) -> Cart {
        match self.try_load(restaurant_id) {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::empty(restaurant_id.clone()),
            Err(e) => {
                warn!(
                    restaurant_id = %restaurant_id,
                    error = %e,
                    "Discarding malformed stored cart"
                );
                Cart::empty(restaurant_id.clone())
            }
        }
    }

    /// Load `restaurant_id`'s cart, reporting malformed data.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value does not decode into a valid cart.
    pub fn try_load(&self, restaurant_id: &RestaurantId) -> Result<Option<Cart>, StoreError> {
        let Some(raw) = self.storage.get_item(&cart_key(restaurant_id)) else {
            return Ok(None);
        };

        let lines: Vec<CartLine> = serde_json::from_str(&raw)?;
        Ok(Some(Cart::from_lines(restaurant_id.clone(), lines)?))
    }

    /// Replace the stored snapshot for the cart's restaurant.
    pub fn save(&mut self, cart: &Cart) {
        match serde_json::to_string(cart.lines()) {
            Ok(json) => self
                .storage
                .set_item(&cart_key(cart.restaurant_id()), json),
            Err(e) => warn!(
                restaurant_id = %cart.restaurant_id(),
                error = %e,
                "Failed to encode cart"
            ),
        }
    }

    /// Remove the stored cart for `restaurant_id`.
    pub fn clear(&mut self, restaurant_id: &RestaurantId) {
        self.storage.remove_item(&cart_key(restaurant_id));
    }

    /// Borrow the underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Return the underlying storage.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use plateful_core::{MenuItem, Price};

    use super::*;

    fn restaurant(id: &str) -> RestaurantId {
        RestaurantId::new(id)
    }

    fn cart_with_burgers(id: &str, count: usize) -> Cart {
        let mut cart = Cart::empty(restaurant(id));
        let burger = MenuItem::new("i1", "Burger", Price::from_minor(500));
        for _ in 0..count {
            cart.add_item(&burger);
        }
        cart.add_item(&MenuItem::new("i2", "Fries", Price::from_minor(200)));
        cart
    }

    #[test]
    fn test_cart_key_format() {
        assert_eq!(cart_key(&restaurant("abc123")), "cartItems:abc123");
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = CartStore::new(MemoryStorage::default());
        let cart = store.load(&restaurant("r1"));

        assert!(cart.is_empty());
        assert_eq!(cart.restaurant_id(), &restaurant("r1"));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut store = CartStore::new(MemoryStorage::default());
        let cart = cart_with_burgers("r1", 2);

        store.save(&cart);
        assert_eq!(store.load(&restaurant("r1")), cart);
    }

    #[test]
    fn test_saved_value_matches_wire_shape() {
        let mut store = CartStore::new(MemoryStorage::default());
        store.save(&cart_with_burgers("r1", 1));

        let raw = store.storage().get_item("cartItems:r1").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"_id": "i1", "name": "Burger", "price": 500, "quantity": 1},
                {"_id": "i2", "name": "Fries", "price": 200, "quantity": 1}
            ])
        );
    }

    #[test]
    fn test_loads_existing_session_entry_with_any_field_order() {
        let mut storage = MemoryStorage::default();
        storage.set_item(
            "cartItems:r1",
            r#"[{"quantity":3,"price":500,"name":"Burger","_id":"i1"}]"#.to_string(),
        );

        let cart = CartStore::new(storage).load(&restaurant("r1"));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Price::from_minor(1500));
    }

    #[test]
    fn test_malformed_values_load_as_empty() {
        let malformed = [
            "not json",
            r#"{"_id":"i1"}"#,
            r#"[{"_id":"i1","name":"Burger"}]"#,
            r#"[{"_id":"i1","name":"Burger","price":500,"quantity":0}]"#,
            r#"[{"_id":"i1","name":"A","price":1,"quantity":1},{"_id":"i1","name":"B","price":2,"quantity":1}]"#,
        ];

        for raw in malformed {
            let mut storage = MemoryStorage::default();
            storage.set_item("cartItems:r1", raw.to_string());
            let store = CartStore::new(storage);

            assert!(store.try_load(&restaurant("r1")).is_err(), "{raw}");
            assert!(store.load(&restaurant("r1")).is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_restaurants_are_isolated() {
        let mut store = CartStore::new(MemoryStorage::default());
        store.save(&cart_with_burgers("r1", 3));
        store.save(&cart_with_burgers("r2", 1));

        assert_eq!(store.load(&restaurant("r1")).item_count(), 4);
        assert_eq!(store.load(&restaurant("r2")).item_count(), 2);

        store.clear(&restaurant("r1"));
        assert!(store.load(&restaurant("r1")).is_empty());
        assert_eq!(store.load(&restaurant("r2")).item_count(), 2);
    }
}
