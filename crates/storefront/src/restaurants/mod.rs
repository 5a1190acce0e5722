//! Restaurant data source.
//!
//! # Architecture
//!
//! - [`RestaurantSource`] is the read-only collaborator the cart depends on
//!   for menu items and the delivery fee
//! - [`RestaurantClient`] talks to the restaurant GraphQL API over `reqwest`
//!   and caches responses via `moka`
//! - [`InMemoryRestaurants`] serves a fixed set of restaurants (local runs
//!   and tests)
//!
//! # Example
//!
//! ```rust,ignore
//! use plateful_storefront::restaurants::{RestaurantClient, RestaurantSource};
//!
//! let client = RestaurantClient::new(&config.restaurants);
//! let restaurant = client.get_restaurant(&restaurant_id).await?;
//! let fee = restaurant.delivery_fee;
//! ```

mod client;
mod memory;
pub mod queries;

pub use client::RestaurantClient;
pub use memory::InMemoryRestaurants;

use async_trait::async_trait;
use plateful_core::{Restaurant, RestaurantId};
use serde::Deserialize;
use thiserror::Error;

/// Read-only access to restaurant details.
#[async_trait]
pub trait RestaurantSource: Send + Sync {
    /// Fetch a restaurant with its menu.
    ///
    /// # Errors
    ///
    /// Returns [`RestaurantError::NotFound`] for unknown ids, or another
    /// variant if the source could not be reached or understood.
    async fn get_restaurant(&self, id: &RestaurantId) -> Result<Restaurant, RestaurantError>;
}

/// Errors that can occur when fetching restaurant details.
#[derive(Debug, Error)]
pub enum RestaurantError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Restaurant not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// A GraphQL error returned by the restaurant API.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    /// Error message.
    #[serde(default)]
    pub message: String,
    /// Path to the error in the response.
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let path = e
                .path
                .iter()
                .map(|p| match p {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".");

            match (e.message.is_empty(), path.is_empty()) {
                (true, true) => format!("[error {}]: (no details)", i + 1),
                (false, true) => e.message.clone(),
                (true, false) => format!("path: {path}"),
                (false, false) => format!("{} path: {path}", e.message),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = RestaurantError::NotFound("r-123".to_string());
        assert_eq!(err.to_string(), "Not found: r-123");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = RestaurantError::GraphQL(vec![
            GraphQLError::message("Restaurant lookup failed"),
            GraphQLError {
                message: String::new(),
                path: vec![
                    serde_json::Value::String("getRestaurant".to_string()),
                    serde_json::Value::Number(0.into()),
                ],
            },
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Restaurant lookup failed; path: getRestaurant.0"
        );
    }

    #[test]
    fn test_graphql_error_no_details() {
        let err = RestaurantError::GraphQL(vec![GraphQLError::message("")]);
        assert_eq!(err.to_string(), "GraphQL errors: [error 1]: (no details)");

        let err = RestaurantError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = RestaurantError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }
}
