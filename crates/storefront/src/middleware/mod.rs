//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions over a bounded in-memory store)

pub mod session;

pub use session::{
    CartSessionStore, EXPIRY_SWEEP_INTERVAL, SESSION_COOKIE_NAME, create_session_layer,
};
