//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side failures to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plateful_core::{CheckoutRejection, DeliveryDetailsError};
use thiserror::Error;

use crate::restaurants::RestaurantError;
use crate::services::{CheckoutError, CheckoutFailure};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Restaurant data source failed.
    #[error("Restaurant error: {0}")]
    Restaurant(#[from] RestaurantError),

    /// Checkout initiator failed. The cart is unchanged.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// The checkout gate refused the cart.
    #[error("Checkout rejected: {0}")]
    Rejected(#[from] CheckoutRejection),

    /// Delivery details failed validation.
    #[error("Invalid delivery details: {0}")]
    InvalidDetails(#[from] DeliveryDetailsError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<CheckoutFailure> for AppError {
    fn from(failure: CheckoutFailure) -> Self {
        match failure {
            CheckoutFailure::Rejected(rejection) => Self::Rejected(rejection),
            CheckoutFailure::Initiation(e) => Self::Checkout(e),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Restaurant(RestaurantError::NotFound(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Restaurant(RestaurantError::RateLimited(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Restaurant(_) | Self::Checkout(_) => StatusCode::BAD_GATEWAY,
            Self::Rejected(CheckoutRejection::EmptyCart) | Self::InvalidDetails(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Rejected(CheckoutRejection::RestaurantMismatch { .. }) => StatusCode::CONFLICT,
        }
    }

    const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Checkout(_)
                | Self::Restaurant(
                    RestaurantError::Http(_)
                        | RestaurantError::GraphQL(_)
                        | RestaurantError::Parse(_)
                )
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Restaurant(RestaurantError::NotFound(_)) => "Restaurant not found".to_string(),
            Self::Restaurant(_) => "Restaurant details are unavailable right now".to_string(),
            Self::Checkout(_) => "Unable to start checkout, please try again".to_string(),
            Self::Rejected(CheckoutRejection::EmptyCart) => "Your cart is empty".to_string(),
            Self::Rejected(rejection) => rejection.to_string(),
            Self::InvalidDetails(e) => e.to_string(),
            Self::NotFound(_) => self.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use plateful_core::RestaurantId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("menu item i9".to_string());
        assert_eq!(err.to_string(), "Not found: menu item i9");

        let err = AppError::Rejected(CheckoutRejection::EmptyCart);
        assert_eq!(
            err.to_string(),
            "Checkout rejected: cannot check out an empty cart"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Restaurant(RestaurantError::NotFound(
                "r1".to_string()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Restaurant(RestaurantError::RateLimited(5))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::Parse("x".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Rejected(CheckoutRejection::EmptyCart)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Rejected(CheckoutRejection::RestaurantMismatch {
                cart: RestaurantId::new("r1"),
                requested: RestaurantId::new("r2"),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::InvalidDetails(DeliveryDetailsError::Missing(
                "city"
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_checkout_failure_conversion() {
        let err = AppError::from(CheckoutFailure::Rejected(CheckoutRejection::EmptyCart));
        assert!(matches!(err, AppError::Rejected(CheckoutRejection::EmptyCart)));

        let err = AppError::from(CheckoutFailure::Initiation(CheckoutError::Api {
            status: 500,
            message: "boom".to_string(),
        }));
        assert!(matches!(err, AppError::Checkout(_)));
    }
}
