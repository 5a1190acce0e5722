//! Checkout gate and hand-off to the checkout initiator.
//!
//! The initiator is an external service that turns a cart into a payment
//! session and answers with a redirect URL. This module builds the request
//! from the live cart, delegates exactly once (no retries), and clears the
//! cart only after the initiator accepted it.

use async_trait::async_trait;
use plateful_core::{
    CheckoutRejection, CheckoutRequest, DeliveryDetails, MenuItemId, RestaurantId,
};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::CheckoutConfig;
use crate::services::cart::CartManager;
use crate::store::SessionStorage;

/// Header carrying the request id so the initiator can dedupe its own retries.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Errors that can occur when starting a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The initiator answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The redirect target is not a valid URL.
    #[error("Invalid redirect URL: {0}")]
    InvalidRedirect(#[from] url::ParseError),
}

/// Why a checkout attempt did not produce a redirect.
#[derive(Debug, Error)]
pub enum CheckoutFailure {
    /// The gate refused to build a request; nothing was sent.
    #[error(transparent)]
    Rejected(#[from] CheckoutRejection),

    /// The initiator failed; the cart was left unchanged.
    #[error(transparent)]
    Initiation(#[from] CheckoutError),
}

/// Where to send the user to complete payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub url: String,
}

/// An external service that starts a checkout for a cart.
#[async_trait]
pub trait CheckoutInitiator: Send + Sync {
    /// Start a checkout session for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be created.
    async fn initiate(&self, request: &CheckoutRequest) -> Result<CheckoutRedirect, CheckoutError>;
}

/// Hand `request` to `initiator`. Called once per attempt, never retried here.
///
/// # Errors
///
/// Returns the initiator's error unchanged.
pub async fn invoke_checkout(
    initiator: &dyn CheckoutInitiator,
    request: &CheckoutRequest,
) -> Result<CheckoutRedirect, CheckoutError> {
    initiator.initiate(request).await
}

/// Check out the manager's current cart.
///
/// On success the cart is cleared and its stored entry removed. On any
/// failure the cart is left exactly as it was so the user can retry.
///
/// # Errors
///
/// Returns [`CheckoutFailure::Rejected`] for an empty cart or a restaurant
/// mismatch, and [`CheckoutFailure::Initiation`] if the initiator fails.
#[instrument(skip_all, fields(restaurant_id = %restaurant_id))]
pub async fn checkout<S: SessionStorage + Send>(
    manager: &mut CartManager<S>,
    initiator: &dyn CheckoutInitiator,
    restaurant_id: &RestaurantId,
    delivery_details: DeliveryDetails,
) -> Result<CheckoutRedirect, CheckoutFailure> {
    let request = CheckoutRequest::build(manager.current_cart(), restaurant_id, delivery_details)?;

    match invoke_checkout(initiator, &request).await {
        Ok(redirect) => {
            info!(request_id = %request.id, lines = request.lines.len(), "Checkout started");
            manager.clear();
            Ok(redirect)
        }
        Err(e) => {
            warn!(request_id = %request.id, error = %e, "Checkout initiation failed");
            Err(e.into())
        }
    }
}

// =============================================================================
// HTTP initiator
// =============================================================================

/// Checkout initiator reached over HTTP.
///
/// POSTs the cart as JSON and expects `{"url": "..."}` back.
#[derive(Clone)]
pub struct HttpCheckoutClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutPayload<'a> {
    restaurant_id: &'a RestaurantId,
    cart_items: Vec<CheckoutItem<'a>>,
    delivery_details: &'a DeliveryDetails,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutItem<'a> {
    menu_item_id: &'a MenuItemId,
    name: &'a str,
    quantity: u32,
}

impl<'a> From<&'a CheckoutRequest> for CheckoutPayload<'a> {
    fn from(request: &'a CheckoutRequest) -> Self {
        Self {
            restaurant_id: &request.restaurant_id,
            cart_items: request
                .lines
                .iter()
                .map(|line| CheckoutItem {
                    menu_item_id: &line.item_id,
                    name: &line.name,
                    quantity: line.quantity,
                })
                .collect(),
            delivery_details: &request.delivery_details,
        }
    }
}

impl HttpCheckoutClient {
    /// Create a new checkout client.
    ///
    /// # Errors
    ///
    /// Returns error if the API token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CheckoutConfig) -> Result<Self, CheckoutError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let auth_value = format!("Bearer {}", token.expose_secret());
            let mut value = HeaderValue::from_str(&auth_value)
                .map_err(|e| CheckoutError::Parse(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert("Authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.to_string(),
        })
    }
}

#[async_trait]
impl CheckoutInitiator for HttpCheckoutClient {
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    async fn initiate(&self, request: &CheckoutRequest) -> Result<CheckoutRedirect, CheckoutError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(IDEMPOTENCY_KEY_HEADER, request.id.to_string())
            .json(&CheckoutPayload::from(request))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        parse_checkout_response(status, &body)
    }
}

/// Map the initiator's answer to a redirect.
///
/// Non-success statuses become [`CheckoutError::Api`] with the body cut to
/// 200 characters. The `url` must parse as an absolute URL.
fn parse_checkout_response(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<CheckoutRedirect, CheckoutError> {
    if !status.is_success() {
        return Err(CheckoutError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    let redirect: CheckoutRedirect =
        serde_json::from_str(body).map_err(|e| CheckoutError::Parse(e.to_string()))?;
    url::Url::parse(&redirect.url)?;

    Ok(redirect)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use plateful_core::{MenuItem, Price};

    use super::*;
    use crate::store::MemoryStorage;

    /// Records requests and answers with a fixed outcome.
    struct FakeInitiator {
        fail: bool,
        seen: Mutex<Vec<CheckoutRequest>>,
    }

    impl FakeInitiator {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CheckoutInitiator for FakeInitiator {
        async fn initiate(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutRedirect, CheckoutError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                Err(CheckoutError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            } else {
                Ok(CheckoutRedirect {
                    url: "https://pay.example/session/1".to_string(),
                })
            }
        }
    }

    fn details() -> DeliveryDetails {
        DeliveryDetails::new("Ada", "1 Main St", "Leeds", "UK").unwrap()
    }

    fn manager_with_burger() -> CartManager<MemoryStorage> {
        let mut manager = CartManager::open(
            MemoryStorage::default(),
            RestaurantId::new("r1"),
            Price::from_minor(150),
        );
        manager.add_item(&MenuItem::new("i1", "Burger", Price::from_minor(500)));
        manager
    }

    #[tokio::test]
    async fn test_successful_checkout_clears_cart() {
        let mut manager = manager_with_burger();
        let initiator = FakeInitiator::new(false);

        let redirect = checkout(&mut manager, &initiator, &RestaurantId::new("r1"), details())
            .await
            .unwrap();

        assert_eq!(redirect.url, "https://pay.example/session/1");
        assert!(manager.current_cart().is_empty());
        assert_eq!(initiator.seen.lock().unwrap().len(), 1);
        assert!(manager.into_storage().get_item("cartItems:r1").is_none());
    }

    #[tokio::test]
    async fn test_failed_initiation_keeps_cart() {
        let mut manager = manager_with_burger();
        let initiator = FakeInitiator::new(true);

        let result = checkout(&mut manager, &initiator, &RestaurantId::new("r1"), details()).await;

        assert!(matches!(result, Err(CheckoutFailure::Initiation(_))));
        assert_eq!(manager.item_count(), 1);
        assert_eq!(initiator.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_initiator() {
        let mut manager = CartManager::open(
            MemoryStorage::default(),
            RestaurantId::new("r1"),
            Price::ZERO,
        );
        let initiator = FakeInitiator::new(false);

        let result = checkout(&mut manager, &initiator, &RestaurantId::new("r1"), details()).await;

        assert!(matches!(
            result,
            Err(CheckoutFailure::Rejected(CheckoutRejection::EmptyCart))
        ));
        assert!(initiator.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_payload_shape() {
        let manager = manager_with_burger();
        let request = CheckoutRequest::build(
            manager.current_cart(),
            &RestaurantId::new("r1"),
            details().with_email("ada@example.com"),
        )
        .unwrap();

        let value = serde_json::to_value(CheckoutPayload::from(&request)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "restaurantId": "r1",
                "cartItems": [{"menuItemId": "i1", "name": "Burger", "quantity": 1}],
                "deliveryDetails": {
                    "email": "ada@example.com",
                    "name": "Ada",
                    "addressLine1": "1 Main St",
                    "city": "Leeds",
                    "country": "UK"
                }
            })
        );
    }

    #[test]
    fn test_success_response_yields_redirect() {
        let redirect = parse_checkout_response(
            reqwest::StatusCode::OK,
            r#"{"url":"https://pay.example/session/9"}"#,
        )
        .unwrap();
        assert_eq!(redirect.url, "https://pay.example/session/9");
    }

    #[test]
    fn test_error_status_truncates_message() {
        let body = "x".repeat(500);
        let err = parse_checkout_response(reqwest::StatusCode::SERVICE_UNAVAILABLE, &body)
            .unwrap_err();

        match err {
            CheckoutError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message.chars().count(), 200);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_relative_redirect_is_rejected() {
        let err = parse_checkout_response(reqwest::StatusCode::OK, r#"{"url":"/pay/9"}"#)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidRedirect(_)));
    }

    #[test]
    fn test_unexpected_body_is_parse_error() {
        let err = parse_checkout_response(reqwest::StatusCode::OK, r#"{"redirect":"x"}"#)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Parse(_)));
    }

    #[test]
    fn test_client_rejects_unprintable_token() {
        let config = CheckoutConfig {
            endpoint: "https://checkout.example/sessions".parse().unwrap(),
            api_token: Some("bad\ntoken".to_string().into()),
        };
        assert!(matches!(
            HttpCheckoutClient::new(&config),
            Err(CheckoutError::Parse(_))
        ));
    }
}
