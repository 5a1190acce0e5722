//! Bridge between `tower-sessions` and [`MemoryStorage`] working copies.
//!
//! Cart operations are synchronous, while session reads and writes are async.
//! A handler hydrates a working copy holding the one restaurant's entry, runs
//! the cart operations against it, then flushes whatever changed.

use plateful_core::RestaurantId;
use tower_sessions::Session;
use tracing::warn;

use super::{MemoryStorage, cart_key};

/// Copy `restaurant_id`'s cart entry from the session into a working copy.
///
/// A missing, unreadable or non-string entry yields an empty working copy;
/// the cart then loads as empty.
pub async fn hydrate(session: &Session, restaurant_id: &RestaurantId) -> MemoryStorage {
    let key = cart_key(restaurant_id);

    match session.get::<String>(&key).await {
        Ok(Some(raw)) => MemoryStorage::from_entries([(key, raw)]),
        Ok(None) => MemoryStorage::default(),
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read cart from session");
            MemoryStorage::default()
        }
    }
}

/// Write every changed entry of `storage` back to the session.
///
/// Writes are best-effort: failures are logged and the in-memory cart stays
/// authoritative for the rest of the request.
pub async fn flush(session: &Session, storage: &mut MemoryStorage) {
    for (key, value) in storage.take_changes() {
        let result = match value {
            Some(raw) => session.insert(&key, raw).await,
            None => session
                .remove::<serde_json::Value>(&key)
                .await
                .map(|_| ()),
        };

        if let Err(e) = result {
            warn!(key = %key, error = %e, "Failed to write cart to session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::middleware::CartSessionStore;
    use crate::store::SessionStorage;

    fn session() -> Session {
        Session::new(None, Arc::new(CartSessionStore::default()), None)
    }

    #[tokio::test]
    async fn test_hydrate_empty_session() {
        let session = session();
        let storage = hydrate(&session, &RestaurantId::new("r1")).await;
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_flush_then_hydrate_round_trips() {
        let session = session();
        let mut storage = MemoryStorage::default();
        storage.set_item("cartItems:r1", "[]".to_string());

        flush(&session, &mut storage).await;

        let hydrated = hydrate(&session, &RestaurantId::new("r1")).await;
        assert_eq!(hydrated.get_item("cartItems:r1").as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_hydrate_only_reads_requested_restaurant() {
        let session = session();
        session
            .insert("cartItems:r1", "[1]".to_string())
            .await
            .unwrap();
        session
            .insert("cartItems:r2", "[2]".to_string())
            .await
            .unwrap();

        let hydrated = hydrate(&session, &RestaurantId::new("r2")).await;
        assert_eq!(hydrated.len(), 1);
        assert_eq!(hydrated.get_item("cartItems:r2").as_deref(), Some("[2]"));
    }

    #[tokio::test]
    async fn test_non_string_entry_hydrates_empty() {
        let session = session();
        session.insert("cartItems:r1", 42).await.unwrap();

        let hydrated = hydrate(&session, &RestaurantId::new("r1")).await;
        assert!(hydrated.is_empty());
    }

    #[tokio::test]
    async fn test_flush_removes_cleared_keys() {
        let session = session();
        session
            .insert("cartItems:r1", "[]".to_string())
            .await
            .unwrap();

        let mut storage = hydrate(&session, &RestaurantId::new("r1")).await;
        storage.remove_item("cartItems:r1");
        flush(&session, &mut storage).await;

        assert!(
            session
                .get::<String>("cartItems:r1")
                .await
                .unwrap()
                .is_none()
        );
    }
}
