//! GraphQL documents and response shapes for the restaurant API.

use plateful_core::Restaurant;
use serde::Deserialize;

use super::{GraphQLError, RestaurantError};

/// Fetch one restaurant with its menu.
pub const GET_RESTAURANT: &str = r"query GetRestaurant($restaurantId: String!) {
  getRestaurant(restaurantId: $restaurantId) {
    _id
    restaurantName
    city
    country
    deliveryFee
    estimatedDeliveryTime
    cuisines
    imageUrl
    menuItems {
      _id
      name
      price
    }
  }
}";

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQLError>>,
}

/// `data` of [`GET_RESTAURANT`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRestaurantData {
    pub get_restaurant: Option<Restaurant>,
}

/// Decode a GraphQL response body, surfacing GraphQL errors.
///
/// # Errors
///
/// Returns [`RestaurantError::Parse`] for bodies that are not a GraphQL
/// envelope and [`RestaurantError::GraphQL`] when the envelope carries errors
/// or no data.
pub fn parse_response<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, RestaurantError> {
    let response: GraphQLResponse<T> = serde_json::from_str(body)?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        tracing::debug!(errors = ?errors, "GraphQL errors in response");
        return Err(RestaurantError::GraphQL(errors));
    }

    response
        .data
        .ok_or_else(|| RestaurantError::GraphQL(vec![GraphQLError::message("No data in response")]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use plateful_core::{Price, RestaurantId};

    use super::*;

    #[test]
    fn test_parse_restaurant() {
        let body = r#"{"data":{"getRestaurant":{
            "_id":"r1","restaurantName":"Burger Barn","deliveryFee":150,
            "menuItems":[{"_id":"i1","name":"Burger","price":500}]
        }}}"#;

        let data: GetRestaurantData = parse_response(body).unwrap();
        let restaurant = data.get_restaurant.unwrap();
        assert_eq!(restaurant.id, RestaurantId::new("r1"));
        assert_eq!(restaurant.delivery_fee, Price::from_minor(150));
        assert_eq!(restaurant.menu_items.len(), 1);
    }

    #[test]
    fn test_parse_null_restaurant() {
        let body = r#"{"data":{"getRestaurant":null}}"#;
        let data: GetRestaurantData = parse_response(body).unwrap();
        assert!(data.get_restaurant.is_none());
    }

    #[test]
    fn test_parse_graphql_errors() {
        let body = r#"{"data":null,"errors":[{"message":"Invalid id","path":["getRestaurant"]}]}"#;
        let err = parse_response::<GetRestaurantData>(body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Invalid id path: getRestaurant"
        );
    }

    #[test]
    fn test_parse_missing_data() {
        let err = parse_response::<GetRestaurantData>("{}").unwrap_err();
        assert!(matches!(err, RestaurantError::GraphQL(_)));
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_response::<GetRestaurantData>("<html>").unwrap_err();
        assert!(matches!(err, RestaurantError::Parse(_)));
    }
}
