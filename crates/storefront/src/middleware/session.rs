//! Session middleware configuration.
//!
//! Carts live in an in-process session store behind a browser-session cookie.
//! The store is a bounded `moka` cache: idle sessions age out, the least
//! recently used session is evicted at capacity, and a background sweep
//! deletes records whose expiry date has passed.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};
use tracing::{debug, warn};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "plateful_session";

/// Maximum number of sessions held at once.
pub const MAX_SESSIONS: u64 = 100_000;

/// Sessions untouched for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// How often expired records are swept.
pub const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Bounded in-memory session store.
///
/// Clones share the same records.
#[derive(Clone)]
pub struct CartSessionStore {
    records: Cache<Id, Record>,
}

impl CartSessionStore {
    /// Create a store holding at most `max_sessions` sessions, each dropped
    /// after `idle_timeout` without access.
    #[must_use]
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        let records = Cache::builder()
            .max_capacity(max_sessions)
            .eviction_policy(EvictionPolicy::lru())
            .time_to_idle(idle_timeout)
            .build();

        Self { records }
    }

    /// Number of records currently held, including expired ones not yet swept.
    #[must_use]
    pub fn session_count(&self) -> u64 {
        self.records.entry_count()
    }

    /// Delete expired records every `period` until the task is aborted.
    pub fn spawn_expiry_sweep(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = store.delete_expired().await {
                    warn!(error = %e, "Failed to delete expired sessions");
                }
            }
        })
    }
}

impl Default for CartSessionStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS, SESSION_IDLE_TIMEOUT)
    }
}

impl fmt::Debug for CartSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSessionStore")
            .field("sessions", &self.records.entry_count())
            .finish()
    }
}

fn is_live(record: &Record, now: OffsetDateTime) -> bool {
    record.expiry_date > now
}

#[async_trait]
impl SessionStore for CartSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .records
            .get(session_id)
            .await
            .filter(|record| is_live(record, now)))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for CartSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc();
        let expired: Vec<Id> = self
            .records
            .iter()
            .filter(|(_, record)| !is_live(record, now))
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            self.records.invalidate(id).await;
        }
        self.records.run_pending_tasks().await;

        if !expired.is_empty() {
            debug!(removed = expired.len(), "Deleted expired sessions");
        }
        Ok(())
    }
}

/// Create the session layer over `store`.
///
/// # Arguments
///
/// * `store` - Session store shared with the expiry sweep
/// * `config` - Storefront configuration (for the secure-cookie flag)
#[must_use]
pub fn create_session_layer(
    store: CartSessionStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<CartSessionStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
