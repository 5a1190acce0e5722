//! Order assembly and the checkout gate.
//!
//! The gate has two states, driven purely by cart emptiness. A
//! [`CheckoutRequest`] is a deep copy of the cart taken at checkout time, so
//! later cart mutation never changes a request that has already been built.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::{Cart, CartLine};
use super::id::RestaurantId;
use super::price::Price;

/// Whether the checkout action is available for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutGate {
    Enabled,
    Disabled,
}

impl CheckoutGate {
    /// Gate state for `cart`: enabled iff it has at least one line.
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Self {
        if cart.is_empty() {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// True iff `cart` has at least one line.
#[must_use]
pub fn can_checkout(cart: &Cart) -> bool {
    CheckoutGate::for_cart(cart).is_enabled()
}

/// Reasons a checkout request cannot be built.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutRejection {
    /// The cart has no lines.
    #[error("cannot check out an empty cart")]
    EmptyCart,
    /// The cart belongs to a different restaurant than the one checking out.
    #[error("cart belongs to restaurant {cart}, not {requested}")]
    RestaurantMismatch {
        cart: RestaurantId,
        requested: RestaurantId,
    },
}

/// Errors that can occur when validating [`DeliveryDetails`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryDetailsError {
    /// A required field is blank.
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Where the order should be delivered, taken from the user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    pub address_line1: String,
    pub city: String,
    pub country: String,
}

impl DeliveryDetails {
    /// Create validated delivery details.
    ///
    /// # Errors
    ///
    /// Returns an error if name, address, city or country is blank.
    pub fn new(
        name: impl Into<String>,
        address_line1: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Result<Self, DeliveryDetailsError> {
        Self {
            email: None,
            name: name.into(),
            address_line1: address_line1.into(),
            city: city.into(),
            country: country.into(),
        }
        .validated()
    }

    /// Attach a contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Trim every field and check the required ones are present.
    ///
    /// A blank email is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first blank required field.
    pub fn validated(self) -> Result<Self, DeliveryDetailsError> {
        let required = |value: String, field: &'static str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(DeliveryDetailsError::Missing(field))
            } else {
                Ok(trimmed.to_owned())
            }
        };

        Ok(Self {
            email: self
                .email
                .map(|email| email.trim().to_owned())
                .filter(|email| !email.is_empty()),
            name: required(self.name, "name")?,
            address_line1: required(self.address_line1, "addressLine1")?,
            city: required(self.city, "city")?,
            country: required(self.country, "country")?,
        })
    }
}

/// A snapshot of a cart ready to hand to the checkout initiator.
///
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Unique per built request; forwarded as an idempotency key.
    pub id: Uuid,
    pub restaurant_id: RestaurantId,
    pub lines: Vec<CartLine>,
    pub delivery_details: DeliveryDetails,
}

impl CheckoutRequest {
    /// Build a request from the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutRejection::EmptyCart`] if the cart has no lines and
    /// [`CheckoutRejection::RestaurantMismatch`] if the cart belongs to a
    /// different restaurant than `restaurant_id`.
    pub fn build(
        cart: &Cart,
        restaurant_id: &RestaurantId,
        delivery_details: DeliveryDetails,
    ) -> Result<Self, CheckoutRejection> {
        if !CheckoutGate::for_cart(cart).is_enabled() {
            return Err(CheckoutRejection::EmptyCart);
        }
        if cart.restaurant_id() != restaurant_id {
            return Err(CheckoutRejection::RestaurantMismatch {
                cart: cart.restaurant_id().clone(),
                requested: restaurant_id.clone(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            restaurant_id: restaurant_id.clone(),
            lines: cart.lines().to_vec(),
            delivery_details,
        })
    }

    /// Sum of the request's line prices, excluding fees.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_price).sum()
    }
}
