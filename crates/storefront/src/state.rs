//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::middleware::CartSessionStore;
use crate::restaurants::{RestaurantClient, RestaurantSource};
use crate::services::{CheckoutError, CheckoutInitiator, HttpCheckoutClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the session store and the two external collaborators.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    sessions: CartSessionStore,
    restaurants: Arc<dyn RestaurantSource>,
    checkout: Arc<dyn CheckoutInitiator>,
}

impl AppState {
    /// Create application state backed by the HTTP collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CheckoutError> {
        let restaurants = Arc::new(RestaurantClient::new(&config.restaurants));
        let checkout = Arc::new(HttpCheckoutClient::new(&config.checkout)?);

        Ok(Self::with_collaborators(config, restaurants, checkout))
    }

    /// Create application state with explicit collaborators.
    #[must_use]
    pub fn with_collaborators(
        config: StorefrontConfig,
        restaurants: Arc<dyn RestaurantSource>,
        checkout: Arc<dyn CheckoutInitiator>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions: CartSessionStore::default(),
                restaurants,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the session store backing the cart sessions.
    #[must_use]
    pub fn sessions(&self) -> &CartSessionStore {
        &self.inner.sessions
    }

    /// Get the restaurant data source.
    #[must_use]
    pub fn restaurants(&self) -> &dyn RestaurantSource {
        self.inner.restaurants.as_ref()
    }

    /// Get the checkout initiator.
    #[must_use]
    pub fn checkout(&self) -> &dyn CheckoutInitiator {
        self.inner.checkout.as_ref()
    }
}
