//! Cart route handlers.
//!
//! Each request hydrates a working copy of the restaurant's session entry,
//! runs synchronous cart operations against it, and flushes what changed
//! back into the session.

use axum::{
    Json,
    extract::{Path, State},
};
use plateful_core::{
    DeliveryDetails, MenuItemId, Price, Restaurant, RestaurantId, can_checkout,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::{self, CartManager, CheckoutRedirect};
use crate::state::AppState;
use crate::store::{self, MemoryStorage};

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    #[serde(rename = "_id")]
    pub id: MenuItemId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub line_price: Price,
}

/// Cart display data, including derived totals and the checkout gate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub restaurant_id: RestaurantId,
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
    pub checkout_enabled: bool,
}

impl CartView {
    fn from_manager(manager: &CartManager<MemoryStorage>) -> Self {
        let cart = manager.current_cart();
        Self {
            restaurant_id: cart.restaurant_id().clone(),
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView {
                    id: line.item_id.clone(),
                    name: line.name.clone(),
                    price: line.price,
                    quantity: line.quantity,
                    line_price: line.line_price(),
                })
                .collect(),
            item_count: manager.item_count(),
            subtotal: manager.subtotal(),
            delivery_fee: manager.delivery_fee(),
            total: manager.total_cost(),
            checkout_enabled: can_checkout(cart),
        }
    }
}

/// Restaurant detail page data.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantView {
    pub restaurant: Restaurant,
    pub cart: CartView,
}

/// Add/remove request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemForm {
    pub menu_item_id: MenuItemId,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Open the restaurant's cart from the session.
async fn open_cart(session: &Session, restaurant: &Restaurant) -> CartManager<MemoryStorage> {
    let storage = store::session::hydrate(session, &restaurant.id).await;
    CartManager::open(storage, restaurant.id.clone(), restaurant.delivery_fee)
}

/// Write the cart's changes back to the session.
async fn save_cart(session: &Session, manager: CartManager<MemoryStorage>) {
    let mut storage = manager.into_storage();
    store::session::flush(session, &mut storage).await;
}

// =============================================================================
// Handlers
// =============================================================================

/// Restaurant details with the visitor's cart for it.
#[instrument(skip(state, session))]
pub async fn show_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
    session: Session,
) -> Result<Json<RestaurantView>> {
    let restaurant = state.restaurants().get_restaurant(&restaurant_id).await?;
    let manager = open_cart(&session, &restaurant).await;
    let cart = CartView::from_manager(&manager);

    Ok(Json(RestaurantView { restaurant, cart }))
}

/// Current cart for a restaurant.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
    session: Session,
) -> Result<Json<CartView>> {
    let restaurant = state.restaurants().get_restaurant(&restaurant_id).await?;
    let manager = open_cart(&session, &restaurant).await;

    Ok(Json(CartView::from_manager(&manager)))
}

/// Add one unit of a menu item.
///
/// The id is resolved against the restaurant's menu to get the name and price
/// captured on the cart line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
    session: Session,
    Json(form): Json<CartItemForm>,
) -> Result<Json<CartView>> {
    let restaurant = state.restaurants().get_restaurant(&restaurant_id).await?;
    let item = restaurant
        .menu_item(&form.menu_item_id)
        .ok_or_else(|| AppError::NotFound(format!("menu item {}", form.menu_item_id)))?
        .clone();

    let mut manager = open_cart(&session, &restaurant).await;
    manager.add_item(&item);
    let view = CartView::from_manager(&manager);
    save_cart(&session, manager).await;

    Ok(Json(view))
}

/// Remove a line entirely. Unknown ids are accepted.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
    session: Session,
    Json(form): Json<CartItemForm>,
) -> Result<Json<CartView>> {
    let restaurant = state.restaurants().get_restaurant(&restaurant_id).await?;

    let mut manager = open_cart(&session, &restaurant).await;
    manager.remove_item_by_id(&form.menu_item_id);
    let view = CartView::from_manager(&manager);
    save_cart(&session, manager).await;

    Ok(Json(view))
}

/// Start checkout and return the redirect target.
///
/// The cart is cleared only when the checkout initiator accepts it.
#[instrument(skip(state, session, details))]
pub async fn checkout(
    State(state): State<AppState>,
    Path(restaurant_id): Path<RestaurantId>,
    session: Session,
    Json(details): Json<DeliveryDetails>,
) -> Result<Json<CheckoutRedirect>> {
    let details = details.validated()?;
    let restaurant = state.restaurants().get_restaurant(&restaurant_id).await?;

    let mut manager = open_cart(&session, &restaurant).await;
    let result = services::checkout(&mut manager, state.checkout(), &restaurant_id, details).await;
    save_cart(&session, manager).await;

    Ok(Json(result?))
}
