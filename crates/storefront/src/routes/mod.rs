//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Restaurant detail
//! GET  /restaurants/{id}                - Restaurant with menu and cart
//!
//! # Cart (JSON)
//! GET  /restaurants/{id}/cart           - Cart view
//! POST /restaurants/{id}/cart/add       - Add one unit ({"menuItemId"})
//! POST /restaurants/{id}/cart/remove    - Remove a whole line ({"menuItemId"})
//!
//! # Checkout
//! POST /restaurants/{id}/checkout       - Delivery details -> {"url"}
//! ```

pub mod cart;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create the restaurant routes router.
pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(cart::show_restaurant))
        .nest("/{id}/cart", cart_routes())
        .route("/{id}/checkout", post(cart::checkout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/restaurants", restaurant_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
