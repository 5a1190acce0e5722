//! Core types for Plateful.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod checkout;
pub mod id;
pub mod menu;
pub mod price;

pub use cart::{Cart, CartError, CartLine};
pub use checkout::{
    CheckoutGate, CheckoutRejection, CheckoutRequest, DeliveryDetails, DeliveryDetailsError,
    can_checkout,
};
pub use id::*;
pub use menu::{MenuItem, Restaurant};
pub use price::Price;
