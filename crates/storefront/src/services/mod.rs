//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - The per-restaurant cart state manager
//! - `checkout` - Checkout gate and hand-off to the checkout initiator

pub mod cart;
pub mod checkout;

pub use cart::CartManager;
pub use checkout::{
    CheckoutError, CheckoutFailure, CheckoutInitiator, CheckoutRedirect, HttpCheckoutClient,
    checkout, invoke_checkout,
};
