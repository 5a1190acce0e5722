//! Restaurant GraphQL API client.
//!
//! Sends hand-written GraphQL documents with `reqwest` and caches restaurants
//! using `moka` (TTL from configuration).

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use plateful_core::{Restaurant, RestaurantId};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::queries::{GET_RESTAURANT, GetRestaurantData, parse_response};
use super::{RestaurantError, RestaurantSource};
use crate::config::RestaurantApiConfig;

/// Client for the restaurant GraphQL API.
///
/// Cheaply cloneable; clones share the HTTP client and cache.
#[derive(Clone)]
pub struct RestaurantClient {
    inner: Arc<RestaurantClientInner>,
}

struct RestaurantClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<RestaurantId, Restaurant>,
}

impl RestaurantClient {
    /// Create a new restaurant API client.
    #[must_use]
    pub fn new(config: &RestaurantApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(RestaurantClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.to_string(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL query.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, RestaurantError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(RestaurantError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Restaurant API returned non-success status"
            );
            return Err(RestaurantError::GraphQL(vec![super::GraphQLError::message(
                format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
            )]));
        }

        parse_response(&body)
    }
}

#[async_trait]
impl RestaurantSource for RestaurantClient {
    #[instrument(skip(self), fields(restaurant_id = %id))]
    async fn get_restaurant(&self, id: &RestaurantId) -> Result<Restaurant, RestaurantError> {
        if let Some(restaurant) = self.inner.cache.get(id).await {
            debug!("Cache hit for restaurant");
            return Ok(restaurant);
        }

        let data: GetRestaurantData = self
            .execute(
                GET_RESTAURANT,
                serde_json::json!({ "restaurantId": id.as_str() }),
            )
            .await?;

        let restaurant = data
            .get_restaurant
            .ok_or_else(|| RestaurantError::NotFound(format!("Restaurant not found: {id}")))?;

        self.inner
            .cache
            .insert(id.clone(), restaurant.clone())
            .await;

        Ok(restaurant)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use plateful_core::Price;

    use super::*;

    fn client() -> RestaurantClient {
        RestaurantClient::new(&RestaurantApiConfig {
            // Nothing listens here; tests must be served from the cache.
            endpoint: "http://127.0.0.1:9/graphql".parse().unwrap(),
            cache_ttl: Duration::from_secs(60),
        })
    }

    fn restaurant() -> Restaurant {
        serde_json::from_value(serde_json::json!({
            "_id": "r1",
            "restaurantName": "Burger Barn",
            "deliveryFee": 150
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_cached_restaurant_skips_network() {
        let client = client();
        client
            .inner
            .cache
            .insert(RestaurantId::new("r1"), restaurant())
            .await;

        let fetched = client.get_restaurant(&RestaurantId::new("r1")).await.unwrap();
        assert_eq!(fetched.delivery_fee, Price::from_minor(150));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        let client = client();

        let err = client
            .get_restaurant(&RestaurantId::new("r1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RestaurantError::Http(_)));
    }
}
