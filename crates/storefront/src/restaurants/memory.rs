//! Fixed, in-memory restaurant source.

use std::collections::HashMap;

use async_trait::async_trait;
use plateful_core::{Restaurant, RestaurantId};

use super::{RestaurantError, RestaurantSource};

/// Serves restaurants from a map built up front.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRestaurants {
    restaurants: HashMap<RestaurantId, Restaurant>,
}

impl InMemoryRestaurants {
    #[must_use]
    pub fn new(restaurants: impl IntoIterator<Item = Restaurant>) -> Self {
        Self {
            restaurants: restaurants
                .into_iter()
                .map(|restaurant| (restaurant.id.clone(), restaurant))
                .collect(),
        }
    }
}

#[async_trait]
impl RestaurantSource for InMemoryRestaurants {
    async fn get_restaurant(&self, id: &RestaurantId) -> Result<Restaurant, RestaurantError> {
        self.restaurants
            .get(id)
            .cloned()
            .ok_or_else(|| RestaurantError::NotFound(format!("Restaurant not found: {id}")))
    }
}
