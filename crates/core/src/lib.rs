//! Plateful Core - Shared cart and menu types.
//!
//! This crate provides the domain types used by the Plateful components:
//! - `storefront` - Restaurant detail API with the per-session cart
//! - `integration-tests` - End-to-end router tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no session
//! access, no HTTP clients. Cart merging, line uniqueness and the checkout
//! gate live here so they can be exercised without any collaborator.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, menus, carts and checkout requests

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
