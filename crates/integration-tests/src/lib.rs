//! Integration test harness for Plateful.
//!
//! Builds the storefront router in-process against fixed collaborators and
//! drives it with `tower::ServiceExt::oneshot`, carrying the session cookie
//! between requests like a browser tab would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p plateful-integration-tests
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use plateful_core::{CheckoutRequest, MenuItem, Price, Restaurant, RestaurantId};
use plateful_storefront::{
    config::StorefrontConfig,
    restaurants::InMemoryRestaurants,
    services::{CheckoutError, CheckoutInitiator, CheckoutRedirect},
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Redirect URL returned by [`RecordingCheckout`] on success.
pub const CHECKOUT_URL: &str = "https://pay.example.com/session/abc";

/// Configuration with local placeholder endpoints; nothing is contacted.
///
/// # Panics
///
/// Panics if the fixed variables fail to parse.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| match key {
        "PLATEFUL_BASE_URL" => Some("http://localhost:3000".to_string()),
        "RESTAURANT_API_URL" => Some("http://localhost:4000/graphql".to_string()),
        "CHECKOUT_API_URL" => Some("http://localhost:4000/api/checkout".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

/// Build a restaurant with the given menu and delivery fee.
#[must_use]
pub fn restaurant(id: &str, delivery_fee: i64, menu: &[(&str, &str, i64)]) -> Restaurant {
    Restaurant {
        id: RestaurantId::new(id),
        name: format!("Restaurant {id}"),
        city: "Leeds".to_string(),
        country: "UK".to_string(),
        delivery_fee: Price::from_minor(delivery_fee),
        estimated_delivery_minutes: 30,
        cuisines: vec!["Pizza".to_string()],
        menu_items: menu
            .iter()
            .map(|(item_id, name, price)| MenuItem::new(*item_id, *name, Price::from_minor(*price)))
            .collect(),
        image_url: String::new(),
    }
}

/// Two restaurants with overlapping menu item ids.
#[must_use]
pub fn sample_restaurants() -> Vec<Restaurant> {
    vec![
        restaurant("r1", 150, &[("i1", "Margherita", 100), ("i2", "Garlic Bread", 350)]),
        restaurant("r2", 0, &[("i1", "Pad Thai", 900)]),
    ]
}

/// Checkout initiator that records every request it sees.
#[derive(Debug, Default)]
pub struct RecordingCheckout {
    fail: bool,
    seen: Mutex<Vec<CheckoutRequest>>,
}

impl RecordingCheckout {
    /// An initiator that always fails with a 503 from upstream.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CheckoutInitiator for RecordingCheckout {
    async fn initiate(&self, request: &CheckoutRequest) -> Result<CheckoutRedirect, CheckoutError> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if self.fail {
            return Err(CheckoutError::Api {
                status: 503,
                message: "payment provider unavailable".to_string(),
            });
        }
        Ok(CheckoutRedirect {
            url: CHECKOUT_URL.to_string(),
        })
    }
}

/// A response reduced to what the tests assert on.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// In-process storefront with a single visitor's cookie jar.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub checkout: Arc<RecordingCheckout>,
}

impl TestApp {
    /// Storefront over [`sample_restaurants`] with a succeeding initiator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_checkout(RecordingCheckout::default())
    }

    /// Storefront over [`sample_restaurants`] with the given initiator.
    #[must_use]
    pub fn with_checkout(checkout: RecordingCheckout) -> Self {
        let checkout = Arc::new(checkout);
        let state = AppState::with_collaborators(
            test_config(),
            Arc::new(InMemoryRestaurants::new(sample_restaurants())),
            checkout.clone(),
        );

        Self {
            router: plateful_storefront::app(state),
            cookie: None,
            checkout,
        }
    }

    /// Start a new browser session against the same server.
    pub fn new_session(&mut self) {
        self.cookie = None;
    }

    /// Send a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&mut self, path: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Add one unit of `item` to `restaurant`'s cart.
    pub async fn add(&mut self, restaurant: &str, item: &str) -> TestResponse {
        let body = serde_json::json!({ "menuItemId": item });
        self.post(&format!("/restaurants/{restaurant}/cart/add"), &body)
            .await
    }

    /// Remove `item`'s line from `restaurant`'s cart.
    pub async fn remove(&mut self, restaurant: &str, item: &str) -> TestResponse {
        let body = serde_json::json!({ "menuItemId": item });
        self.post(&format!("/restaurants/{restaurant}/cart/remove"), &body)
            .await
    }

    /// Fetch `restaurant`'s cart view.
    pub async fn cart(&mut self, restaurant: &str) -> TestResponse {
        self.get(&format!("/restaurants/{restaurant}/cart")).await
    }

    #[allow(clippy::expect_used)]
    async fn send(&mut self, method: Method, path: &str, body: Option<&Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request is well formed");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
