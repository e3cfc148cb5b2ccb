//! Cache mirror for attendee snapshots.
//!
//! Snapshots are cached by QR code. The cache is never authoritative: a
//! cached snapshot can only cause an early "already checked in" answer,
//! which stays correct because flags never go back to false. Every cache
//! failure is logged and the primary store is used instead.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use super::check_in::{AttendeePool, CheckInError, CheckInSubject};
use crate::models::NewCheckIn;

/// Errors reported by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache command error: {0}")]
    Command(String),
}

/// Minimal key/value cache backend.
#[async_trait::async_trait]
pub trait AttendeeCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Stores the value only when the key is absent. Returns whether it was stored.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Round-trip used by health checks.
    async fn ping(&self) -> Result<(), CacheError> {
        self.get("health:ping").await.map(|_| ())
    }
}

/// Wraps an attendee pool with read-through/write-through caching.
pub struct CachedPool<P> {
    inner: P,
    cache: Option<Arc<dyn AttendeeCache>>,
    namespace: &'static str,
}

impl<P> CachedPool<P>
where
    P: AttendeePool,
    P::Attendee: Serialize + DeserializeOwned,
{
    /// Creates a cached pool. `cache: None` disables caching entirely.
    pub fn new(inner: P, cache: Option<Arc<dyn AttendeeCache>>, namespace: &'static str) -> Self {
        Self {
            inner,
            cache,
            namespace,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn cache_key(&self, qr_code: &str) -> String {
        format!("attendee:{}:{}", self.namespace, qr_code)
    }

    /// Drops the cached snapshot for a QR code.
    pub async fn invalidate(&self, qr_code: &str) {
        let Some(cache) = &self.cache else {
            return;
        };
        let key = self.cache_key(qr_code);
        if let Err(e) = cache.delete(&key).await {
            warn!(key = %key, error = %e, "Failed to invalidate cached attendee");
        }
    }

    /// Replaces the cached snapshot after a mutation outside the check-in flow.
    ///
    /// If the write fails the entry is dropped instead, so a stale snapshot
    /// never outlives the mutation.
    pub async fn refresh(&self, attendee: &P::Attendee) {
        if self.cache.is_some() && !self.store(attendee).await {
            self.invalidate(attendee.qr_code()).await;
        }
    }

    async fn read_cached(&self, cache: &dyn AttendeeCache, key: &str) -> Option<P::Attendee> {
        match cache.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(attendee) => Some(attendee),
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding corrupt cached attendee");
                    if let Err(e) = cache.delete(key).await {
                        warn!(key = %key, error = %e, "Failed to delete corrupt cache entry");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, using primary store");
                None
            }
        }
    }

    fn payload(&self, key: &str, attendee: &P::Attendee) -> Option<String> {
        match serde_json::to_string(attendee) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize attendee for cache");
                None
            }
        }
    }

    /// Writes a snapshot unconditionally. Returns false when nothing was written.
    async fn store(&self, attendee: &P::Attendee) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        let key = self.cache_key(attendee.qr_code());
        let Some(payload) = self.payload(&key, attendee) else {
            return false;
        };
        match cache.set(&key, &payload).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Read-through fill. A snapshot stored by a concurrent writer wins,
    /// since this one may have been read before that writer committed.
    async fn fill(&self, attendee: &P::Attendee) {
        let Some(cache) = &self.cache else {
            return;
        };
        let key = self.cache_key(attendee.qr_code());
        let Some(payload) = self.payload(&key, attendee) else {
            return;
        };
        if let Err(e) = cache.set_if_absent(&key, &payload).await {
            warn!(key = %key, error = %e, "Cache fill failed");
        }
    }
}

#[async_trait::async_trait]
impl<P> AttendeePool for CachedPool<P>
where
    P: AttendeePool,
    P::Attendee: Serialize + DeserializeOwned,
{
    type Attendee = P::Attendee;

    async fn find_by_qr_code(
        &self,
        qr_code: &str,
    ) -> Result<Option<Self::Attendee>, CheckInError> {
        if let Some(cache) = &self.cache {
            let key = self.cache_key(qr_code);
            if let Some(attendee) = self.read_cached(cache.as_ref(), &key).await {
                return Ok(Some(attendee));
            }
        }

        let found = self.inner.find_by_qr_code(qr_code).await?;
        if let Some(attendee) = &found {
            self.fill(attendee).await;
        }
        Ok(found)
    }

    async fn append_check_in(
        &self,
        attendee: &Self::Attendee,
        check_in: &NewCheckIn,
    ) -> Result<Option<Self::Attendee>, CheckInError> {
        let updated = self.inner.append_check_in(attendee, check_in).await?;
        match &updated {
            Some(fresh) => {
                if !self.store(fresh).await {
                    self.invalidate(attendee.qr_code()).await;
                }
            }
            None => self.invalidate(attendee.qr_code()).await,
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::farmer::tests::sample_farmer;
    use crate::models::{CheckInType, Farmer};
    use crate::services::check_in::tests::InMemoryPool;
    use crate::services::check_in::{check_in_attendee, record_check_in, CheckInOutcome};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, String>>,
        hits: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AttendeeCache for MapCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            let value = self.entries.lock().unwrap().get(key).cloned();
            if value.is_some() {
                self.hits.fetch_add(1, Ordering::SeqCst);
            }
            Ok(value)
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, CacheError> {
            let mut entries = self.entries.lock().unwrap();
            if entries.contains_key(key) {
                return Ok(false);
            }
            entries.insert(key.to_string(), value.to_string());
            Ok(true)
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct DownCache;

    #[async_trait::async_trait]
    impl AttendeeCache for DownCache {
        async fn get(&self, _: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Connection("connection refused".into()))
        }

        async fn set(&self, _: &str, _: &str) -> Result<(), CacheError> {
            Err(CacheError::Connection("connection refused".into()))
        }

        async fn set_if_absent(&self, _: &str, _: &str) -> Result<bool, CacheError> {
            Err(CacheError::Connection("connection refused".into()))
        }

        async fn delete(&self, _: &str) -> Result<(), CacheError> {
            Err(CacheError::Connection("connection refused".into()))
        }
    }

    fn cached_pool(cache: Arc<dyn AttendeeCache>) -> CachedPool<InMemoryPool<Farmer>> {
        CachedPool::new(
            InMemoryPool::new(vec![sample_farmer("EVENT-ABC123")]),
            Some(cache),
            "farmer",
        )
    }

    fn entry() -> NewCheckIn {
        NewCheckIn::new(CheckInType::Entry, Some("gate-1"), false)
    }

    #[tokio::test]
    async fn test_read_through_fills_cache() {
        let cache = Arc::new(MapCache::default());
        let pool = cached_pool(cache.clone());

        pool.find_by_qr_code("EVENT-ABC123").await.unwrap().unwrap();
        pool.find_by_qr_code("EVENT-ABC123").await.unwrap().unwrap();

        assert_eq!(pool.inner().lookups.load(Ordering::SeqCst), 1);
        assert_eq!(cache.hits.load(Ordering::SeqCst), 1);
        assert!(cache
            .entries
            .lock()
            .unwrap()
            .contains_key("attendee:farmer:EVENT-ABC123"));
    }

    #[tokio::test]
    async fn test_write_through_after_recorded_check_in() {
        let cache = Arc::new(MapCache::default());
        let pool = cached_pool(cache.clone());

        let outcome = record_check_in(&pool, "EVENT-ABC123", &entry(), || "missing".into())
            .await
            .unwrap();
        assert!(outcome.is_recorded());

        let cached = cache
            .entries
            .lock()
            .unwrap()
            .get("attendee:farmer:EVENT-ABC123")
            .cloned()
            .unwrap();
        let cached: Farmer = serde_json::from_str(&cached).unwrap();
        assert!(cached.check_ins.has_entry_check_in);

        // Second attempt is answered from the cached snapshot.
        let outcome = record_check_in(&pool, "EVENT-ABC123", &entry(), || "missing".into())
            .await
            .unwrap();
        assert!(matches!(outcome, CheckInOutcome::AlreadyCheckedIn(_)));
        assert_eq!(pool.inner().lookups.load(Ordering::SeqCst), 1);
        assert_eq!(pool.inner().record_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_entry_is_invalidated_on_lost_race() {
        let cache = Arc::new(MapCache::default());
        let pool = cached_pool(cache.clone());

        // Warm the cache with a snapshot that has no entry flag.
        let stale = pool.find_by_qr_code("EVENT-ABC123").await.unwrap().unwrap();
        pool.inner().race_next_read("EVENT-ABC123", CheckInType::Entry);
        // Consume the stale read flag so the store now reports the true state.
        pool.inner().find_by_qr_code("EVENT-ABC123").await.unwrap();

        let outcome = check_in_attendee(&pool, stale, &entry()).await.unwrap();
        let CheckInOutcome::AlreadyCheckedIn(farmer) = outcome else {
            panic!("expected already checked in");
        };
        assert!(farmer.check_ins.has_entry_check_in);
        assert_eq!(pool.inner().record_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_down_falls_back_to_store() {
        let pool = cached_pool(Arc::new(DownCache));

        let outcome = record_check_in(&pool, "EVENT-ABC123", &entry(), || "missing".into())
            .await
            .unwrap();
        assert!(outcome.is_recorded());
        assert!(outcome.attendee().check_ins.has_entry_check_in);

        let outcome = record_check_in(&pool, "EVENT-ABC123", &entry(), || "missing".into())
            .await
            .unwrap();
        assert!(matches!(outcome, CheckInOutcome::AlreadyCheckedIn(_)));
        assert_eq!(pool.inner().record_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_discarded() {
        let cache = Arc::new(MapCache::default());
        cache
            .set("attendee:farmer:EVENT-ABC123", "{not json")
            .await
            .unwrap();
        let pool = cached_pool(cache.clone());

        let farmer = pool.find_by_qr_code("EVENT-ABC123").await.unwrap().unwrap();
        assert_eq!(farmer.qr_code, "EVENT-ABC123");
        assert_eq!(pool.inner().lookups.load(Ordering::SeqCst), 1);

        let repaired = cache
            .entries
            .lock()
            .unwrap()
            .get("attendee:farmer:EVENT-ABC123")
            .cloned()
            .unwrap();
        assert!(serde_json::from_str::<Farmer>(&repaired).is_ok());
    }

    /// Store that commits a delegate update (and refreshes the cache) while
    /// a read of the previous row is still in flight.
    struct UpdatedDuringRead {
        inner: InMemoryPool<Farmer>,
        cache: Arc<MapCache>,
        updated: Farmer,
    }

    #[async_trait::async_trait]
    impl AttendeePool for UpdatedDuringRead {
        type Attendee = Farmer;

        async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Farmer>, CheckInError> {
            let previous = self.inner.find_by_qr_code(qr_code).await?;
            let payload = serde_json::to_string(&self.updated).unwrap();
            self.cache
                .set(&format!("attendee:farmer:{}", qr_code), &payload)
                .await
                .unwrap();
            Ok(previous)
        }

        async fn append_check_in(
            &self,
            attendee: &Farmer,
            check_in: &NewCheckIn,
        ) -> Result<Option<Farmer>, CheckInError> {
            self.inner.append_check_in(attendee, check_in).await
        }
    }

    fn cached_farmer(cache: &MapCache) -> Farmer {
        let payload = cache
            .entries
            .lock()
            .unwrap()
            .get("attendee:farmer:EVENT-ABC123")
            .cloned()
            .unwrap();
        serde_json::from_str(&payload).unwrap()
    }

    #[tokio::test]
    async fn test_read_through_does_not_overwrite_concurrent_update() {
        let cache = Arc::new(MapCache::default());
        let previous = sample_farmer("EVENT-ABC123");
        let mut updated = previous.clone();
        updated.delegate_name = Some("Sita".to_string());
        updated.is_delegate_attending = true;

        let pool = CachedPool::new(
            UpdatedDuringRead {
                inner: InMemoryPool::new(vec![previous]),
                cache: cache.clone(),
                updated,
            },
            Some(cache.clone() as Arc<dyn AttendeeCache>),
            "farmer",
        );

        let read = pool.find_by_qr_code("EVENT-ABC123").await.unwrap().unwrap();
        assert!(read.delegate_name.is_none());

        let cached = cached_farmer(&cache);
        assert_eq!(cached.delegate_name.as_deref(), Some("Sita"));
        assert!(cached.is_delegate_attending);
    }

    #[tokio::test]
    async fn test_refresh_replaces_cached_snapshot() {
        let cache = Arc::new(MapCache::default());
        let pool = cached_pool(cache.clone());

        let mut farmer = pool.find_by_qr_code("EVENT-ABC123").await.unwrap().unwrap();
        farmer.delegate_name = Some("Sita".to_string());
        farmer.is_delegate_attending = true;
        pool.refresh(&farmer).await;

        let cached = cached_farmer(&cache);
        assert_eq!(cached.delegate_name.as_deref(), Some("Sita"));

        // The next lookup is served from the refreshed snapshot.
        let found = pool.find_by_qr_code("EVENT-ABC123").await.unwrap().unwrap();
        assert!(found.is_delegate_attending);
        assert_eq!(pool.inner().lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_with_cache_down_is_harmless() {
        let pool = cached_pool(Arc::new(DownCache));
        let farmer = sample_farmer("EVENT-ABC123");
        pool.refresh(&farmer).await;
        assert!(pool.find_by_qr_code("EVENT-ABC123").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = Arc::new(MapCache::default());
        let pool = cached_pool(cache.clone());

        pool.find_by_qr_code("EVENT-ABC123").await.unwrap();
        pool.invalidate("EVENT-ABC123").await;

        assert!(cache.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_cache_passes_through() {
        let pool = CachedPool::new(
            InMemoryPool::new(vec![sample_farmer("EVENT-ABC123")]),
            None,
            "farmer",
        );
        assert!(!pool.is_enabled());

        pool.find_by_qr_code("EVENT-ABC123").await.unwrap();
        pool.find_by_qr_code("EVENT-ABC123").await.unwrap();
        pool.invalidate("EVENT-ABC123").await;
        assert_eq!(pool.inner().lookups.load(Ordering::SeqCst), 2);
    }
}
