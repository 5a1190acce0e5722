//! Cart and cart line types.
//!
//! A [`Cart`] belongs to exactly one restaurant and holds at most one
//! [`CartLine`] per menu item. The merge rules live here so every caller
//! (the session-backed manager, tests, future front ends) gets the same
//! behavior.

use serde::{Deserialize, Serialize};

use super::id::{MenuItemId, RestaurantId};
use super::menu::MenuItem;
use super::price::Price;

/// Errors raised when building a cart from untrusted lines.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// A line has a quantity of zero.
    #[error("cart line {0} has zero quantity")]
    ZeroQuantity(MenuItemId),
    /// Two lines share the same menu item id.
    #[error("cart contains more than one line for item {0}")]
    DuplicateLine(MenuItemId),
}

/// One distinct menu item's quantity entry within a cart.
///
/// Serializes as `{"_id", "name", "price", "quantity"}`, the shape stored
/// under the session key for each restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "_id")]
    pub item_id: MenuItemId,
    /// Name captured when the item was first added.
    pub name: String,
    /// Unit price captured when the item was first added.
    pub price: Price,
    pub quantity: u32,
}

impl CartLine {
    /// A fresh line for `item` with a quantity of one.
    #[must_use]
    pub fn from_menu_item(item: &MenuItem) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: 1,
        }
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The ordered set of lines selected for one restaurant.
///
/// ## Invariants
///
/// - every line's `item_id` is distinct
/// - every line's `quantity` is at least one
/// - lines keep the order in which their items were first added
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    restaurant_id: RestaurantId,
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart for `restaurant_id`.
    #[must_use]
    pub const fn empty(restaurant_id: RestaurantId) -> Self {
        Self {
            restaurant_id,
            lines: Vec::new(),
        }
    }

    /// Build a cart from lines decoded from storage or another untrusted source.
    ///
    /// # Errors
    ///
    /// Returns an error if any line has a zero quantity or if two lines share
    /// an item id.
    pub fn from_lines(restaurant_id: RestaurantId, lines: Vec<CartLine>) -> Result<Self, CartError> {
        for (index, line) in lines.iter().enumerate() {
            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity(line.item_id.clone()));
            }
            if lines
                .iter()
                .skip(index + 1)
                .any(|other| other.item_id == line.item_id)
            {
                return Err(CartError::DuplicateLine(line.item_id.clone()));
            }
        }

        Ok(Self {
            restaurant_id,
            lines,
        })
    }

    /// The restaurant this cart belongs to.
    #[must_use]
    pub const fn restaurant_id(&self) -> &RestaurantId {
        &self.restaurant_id
    }

    /// Lines in first-added order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `item_id`, if present.
    #[must_use]
    pub fn line(&self, item_id: &MenuItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.item_id == item_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of price x quantity over all lines, excluding fees.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_price).sum()
    }

    /// Add one unit of `item`.
    ///
    /// An existing line is incremented and keeps the name and price captured
    /// at first add. Otherwise a new line is appended with quantity one.
    pub fn add_item(&mut self, item: &MenuItem) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item_id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine::from_menu_item(item));
        }
    }

    /// Remove the whole line for `item_id`, whatever its quantity.
    ///
    /// Returns the removed line, or `None` if the item was not in the cart.
    pub fn remove_item(&mut self, item_id: &MenuItemId) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| &line.item_id == item_id)?;
        Some(self.lines.remove(index))
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
