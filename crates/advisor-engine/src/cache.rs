//! Time-windowed cache for market data
//!
//! Entries are value + insert-timestamp pairs. Staleness is decided
//! lazily on read by comparing against an injected clock; nothing is
//! ever evicted proactively. A refresh simply overwrites the entry
//! (last writer wins).

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

/// Source of "now" for freshness checks
///
/// Injectable so tests can pin the clock and step it across TTL
/// boundaries deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to; for tests
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Advance the clock by `duration`
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    inserted_at: DateTime<Utc>,
}

/// Key → (value, timestamp) store with per-read TTLs
pub struct TimedStore {
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, Entry>>,
}

impl TimedStore {
    /// Create a store reading time from the given clock
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the cached value for `key` if it is younger than `ttl`
    pub async fn get_fresh(&self, key: &str, ttl: Duration) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        let age = self.clock.now().signed_duration_since(entry.inserted_at);
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::MAX);
        if age < ttl {
            tracing::debug!(key, "cache hit");
            Some(entry.value.clone())
        } else {
            tracing::debug!(key, "cache entry stale");
            None
        }
    }

    /// Insert or overwrite the value for `key`, stamped with the current time
    pub async fn insert(&self, key: impl Into<String>, value: serde_json::Value) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.into(),
            Entry {
                value,
                inserted_at: self.clock.now(),
            },
        );
    }

    /// Number of entries, fresh or stale
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_insert_and_get_fresh() {
        let clock = manual_clock();
        let store = TimedStore::new(clock);
        store.insert("price_VTI", json!({"price": 257.83})).await;

        let value = store
            .get_fresh("price_VTI", Duration::from_secs(3600))
            .await;
        assert_eq!(value, Some(json!({"price": 257.83})));
    }

    #[tokio::test]
    async fn test_entry_goes_stale_past_ttl() {
        let clock = manual_clock();
        let store = TimedStore::new(Arc::clone(&clock) as Arc<dyn Clock>);
        store.insert("price_VTI", json!({"price": 257.83})).await;

        clock.advance(Duration::from_secs(3599));
        assert!(
            store
                .get_fresh("price_VTI", Duration::from_secs(3600))
                .await
                .is_some()
        );

        clock.advance(Duration::from_secs(2));
        assert!(
            store
                .get_fresh("price_VTI", Duration::from_secs(3600))
                .await
                .is_none()
        );
        // Stale entries are not evicted, only ignored
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_overwrites() {
        let clock = manual_clock();
        let store = TimedStore::new(Arc::clone(&clock) as Arc<dyn Clock>);
        store.insert("metrics_BND", json!({"v": 1})).await;

        clock.advance(Duration::from_secs(10));
        store.insert("metrics_BND", json!({"v": 2})).await;

        let value = store
            .get_fresh("metrics_BND", Duration::from_secs(60))
            .await;
        assert_eq!(value, Some(json!({"v": 2})));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_different_ttls_per_read() {
        let clock = manual_clock();
        let store = TimedStore::new(Arc::clone(&clock) as Arc<dyn Clock>);
        store.insert("overview_VTI", json!({})).await;

        clock.advance(Duration::from_secs(7200));
        // Stale under the 1h quote window, fresh under the 24h overview window
        assert!(
            store
                .get_fresh("overview_VTI", Duration::from_secs(3600))
                .await
                .is_none()
        );
        assert!(
            store
                .get_fresh("overview_VTI", Duration::from_secs(86_400))
                .await
                .is_some()
        );
    }
}
