//! Cart state manager.
//!
//! Owns the in-memory cart for the restaurant currently being viewed and
//! mirrors it into a [`CartStore`] after every mutation. Operations are
//! synchronous; each one publishes the new immutable snapshot on a `watch`
//! channel so observers never share mutable state with the manager.

use plateful_core::{Cart, CartLine, MenuItem, MenuItemId, Price, RestaurantId};
use tokio::sync::watch;
use tracing::debug;

use crate::store::{CartStore, SessionStorage};

/// The per-restaurant cart with its persistence mirror.
pub struct CartManager<S> {
    store: CartStore<S>,
    cart: Cart,
    delivery_fee: Price,
    snapshots: watch::Sender<Cart>,
}

impl<S: SessionStorage> CartManager<S> {
    /// Open the cart for `restaurant_id`, seeded from `storage`.
    ///
    /// `delivery_fee` comes from the restaurant data source and is added to
    /// [`CartManager::total_cost`].
    pub fn open(storage: S, restaurant_id: RestaurantId, delivery_fee: Price) -> Self {
        let store = CartStore::new(storage);
        let cart = store.load(&restaurant_id);
        let (snapshots, _) = watch::channel(cart.clone());

        Self {
            store,
            cart,
            delivery_fee,
            snapshots,
        }
    }

    /// Switch to another restaurant's cart.
    ///
    /// The new cart is always reloaded from storage; nothing from the
    /// previous restaurant's in-memory cart carries over.
    pub fn switch_restaurant(&mut self, restaurant_id: RestaurantId, delivery_fee: Price) -> Cart {
        self.cart = self.store.load(&restaurant_id);
        self.delivery_fee = delivery_fee;
        debug!(restaurant_id = %restaurant_id, lines = self.cart.len(), "Switched cart");
        self.publish()
    }

    /// Add one unit of `item`, merging with an existing line.
    ///
    /// Items are accepted whether or not they appear on the current menu.
    pub fn add_item(&mut self, item: &MenuItem) -> Cart {
        self.cart.add_item(item);
        debug!(
            restaurant_id = %self.cart.restaurant_id(),
            item_id = %item.id,
            "Added item to cart"
        );
        self.persist()
    }

    /// Remove the line matching `line`'s item id, whatever its quantity.
    pub fn remove_item(&mut self, line: &CartLine) -> Cart {
        self.remove_item_by_id(&line.item_id)
    }

    /// Remove the line for `item_id`. Missing ids still re-save the cart.
    pub fn remove_item_by_id(&mut self, item_id: &MenuItemId) -> Cart {
        let removed = self.cart.remove_item(item_id);
        debug!(
            restaurant_id = %self.cart.restaurant_id(),
            item_id = %item_id,
            removed = removed.is_some(),
            "Removed item from cart"
        );
        self.persist()
    }

    /// Empty the cart and delete its stored entry.
    pub fn clear(&mut self) -> Cart {
        self.cart.clear();
        self.store.clear(self.cart.restaurant_id());
        debug!(restaurant_id = %self.cart.restaurant_id(), "Cleared cart");
        self.publish()
    }

    /// The current snapshot.
    pub const fn current_cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn restaurant_id(&self) -> &RestaurantId {
        self.cart.restaurant_id()
    }

    pub const fn delivery_fee(&self) -> Price {
        self.delivery_fee
    }

    /// Sum of line prices, excluding the delivery fee.
    pub fn subtotal(&self) -> Price {
        self.cart.subtotal()
    }

    /// Sum of line prices plus the delivery fee.
    pub fn total_cost(&self) -> Price {
        self.cart.subtotal() + self.delivery_fee
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.snapshots.subscribe()
    }

    /// Give back the storage, e.g. to flush it into a session.
    pub fn into_storage(self) -> S {
        self.store.into_inner()
    }

    fn persist(&mut self) -> Cart {
        self.store.save(&self.cart);
        self.publish()
    }

    fn publish(&self) -> Cart {
        self.snapshots.send_replace(self.cart.clone());
        self.cart.clone()
    }
}
