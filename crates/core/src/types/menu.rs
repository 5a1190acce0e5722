//! Restaurant and menu types.
//!
//! These are owned by the restaurant data source and are read-only from the
//! cart's point of view. Field names follow the data source's JSON shape
//! (`_id`, camelCase) so the same types serve both decoding and responses.

use serde::{Deserialize, Serialize};

use super::id::{MenuItemId, RestaurantId};
use super::price::Price;

/// A dish offered by a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Identifier, unique within the restaurant.
    #[serde(rename = "_id")]
    pub id: MenuItemId,
    /// Display name.
    pub name: String,
    /// Price in minor currency units.
    pub price: Price,
}

impl MenuItem {
    /// Create a menu item.
    #[must_use]
    pub fn new(id: impl Into<MenuItemId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// Restaurant details as served by the restaurant data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(rename = "_id")]
    pub id: RestaurantId,
    #[serde(rename = "restaurantName")]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    /// Flat fee added to every order's total.
    #[serde(default)]
    pub delivery_fee: Price,
    #[serde(default, rename = "estimatedDeliveryTime")]
    pub estimated_delivery_minutes: u32,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub image_url: String,
}

impl Restaurant {
    /// Look up a menu item by id.
    #[must_use]
    pub fn menu_item(&self, id: &MenuItemId) -> Option<&MenuItem> {
        self.menu_items.iter().find(|item| &item.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_restaurant_decodes_data_source_shape() {
        let json = r#"{
            "_id": "r1",
            "restaurantName": "Burger Barn",
            "city": "Leeds",
            "country": "United Kingdom",
            "deliveryFee": 150,
            "estimatedDeliveryTime": 30,
            "cuisines": ["Burgers"],
            "menuItems": [{"_id": "i1", "name": "Burger", "price": 500}],
            "imageUrl": "https://img.example/r1.jpg"
        }"#;

        let restaurant: Restaurant = serde_json::from_str(json).unwrap();
        assert_eq!(restaurant.id, RestaurantId::new("r1"));
        assert_eq!(restaurant.name, "Burger Barn");
        assert_eq!(restaurant.delivery_fee, Price::from_minor(150));
        assert_eq!(restaurant.estimated_delivery_minutes, 30);
        assert_eq!(restaurant.menu_items.len(), 1);
    }

    #[test]
    fn test_restaurant_optional_fields_default() {
        let json = r#"{"_id": "r2", "restaurantName": "Bare"}"#;
        let restaurant: Restaurant = serde_json::from_str(json).unwrap();
        assert_eq!(restaurant.delivery_fee, Price::ZERO);
        assert!(restaurant.menu_items.is_empty());
    }

    #[test]
    fn test_menu_item_lookup() {
        let restaurant = Restaurant {
            id: RestaurantId::new("r1"),
            name: "Burger Barn".to_string(),
            city: String::new(),
            country: String::new(),
            delivery_fee: Price::ZERO,
            estimated_delivery_minutes: 0,
            cuisines: Vec::new(),
            menu_items: vec![
                MenuItem::new("i1", "Burger", Price::from_minor(500)),
                MenuItem::new("i2", "Fries", Price::from_minor(200)),
            ],
            image_url: String::new(),
        };

        let fries = restaurant.menu_item(&MenuItemId::new("i2")).unwrap();
        assert_eq!(fries.name, "Fries");
        assert!(restaurant.menu_item(&MenuItemId::new("nope")).is_none());
    }
}
