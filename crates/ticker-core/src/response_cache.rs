// File: crates/ticker-core/src/response_cache.rs
// Summary: Short-TTL LRU cache for rendered responses keyed by token, minute bucket and render params.
// Notes:
// - Age counts from insertion; reads never extend it.
// - Only successful computations are stored. Concurrent misses on one key share
//   a single computation through a pending `OnceCell` kept outside the LRU.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;

use crate::error::Result;

pub const DEFAULT_CAPACITY: usize = 500;
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

type Pending<V> = Arc<OnceCell<Entry<V>>>;

/// Finished entries live in the LRU; in-flight computations wait outside it
/// so a miss never evicts anything until it has a value to store.
struct Slots<V> {
    done: LruCache<String, Entry<V>>,
    pending: HashMap<String, Pending<V>>,
}

#[derive(Default, Debug)]
pub struct ResponseCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub expired: AtomicU64,
}

impl ResponseCacheStats {
    pub fn hits(&self) -> u64 { self.hits.load(Ordering::Relaxed) }
    pub fn misses(&self) -> u64 { self.misses.load(Ordering::Relaxed) }
    pub fn expired(&self) -> u64 { self.expired.load(Ordering::Relaxed) }
}

pub struct ResponseCache<V> {
    slots: Mutex<Slots<V>>,
    ttl: Duration,
    stats: ResponseCacheStats,
}

impl<V: Clone + Send + Sync> ResponseCache<V> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(Slots { done: LruCache::new(capacity), pending: HashMap::new() }),
            ttl,
            stats: ResponseCacheStats::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value for `key`, unless missing or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut slots = self.lock();
        let value = self.fresh(&mut slots, key)?;
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        Some(value)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, value: V) {
        self.lock().done.put(key.to_string(), Entry { value, inserted_at: Instant::now() });
    }

    /// Return the cached value for `key` or run `compute` once to produce it.
    /// A failed computation is returned to its caller and nothing is stored
    /// or evicted.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = {
            let mut slots = self.lock();
            if let Some(value) = self.fresh(&mut slots, key) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "response cache hit");
                return Ok(value);
            }
            slots.pending.entry(key.to_string()).or_default().clone()
        };

        let result = cell
            .get_or_try_init(|| async {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "response cache miss");
                let value = compute().await?;
                Ok(Entry { value, inserted_at: Instant::now() })
            })
            .await;

        let mut slots = self.lock();
        if slots.pending.get(key).is_some_and(|p| Arc::ptr_eq(p, &cell)) {
            slots.pending.remove(key);
        }
        let entry = result?;
        let newer = slots.done.peek(key).is_some_and(|cur| cur.inserted_at >= entry.inserted_at);
        if !newer {
            slots.done.put(key.to_string(), entry.clone());
        }
        Ok(entry.value.clone())
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        self.lock().done.iter().filter(|(_, e)| self.is_fresh(e)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &ResponseCacheStats {
        &self.stats
    }

    /// Fresh value for `key`; an expired entry is dropped and counted.
    fn fresh(&self, slots: &mut Slots<V>, key: &str) -> Option<V> {
        let entry = slots.done.get(key)?;
        if self.is_fresh(entry) {
            return Some(entry.value.clone());
        }
        slots.done.pop(key);
        self.stats.expired.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn is_fresh(&self, e: &Entry<V>) -> bool {
        e.inserted_at.elapsed() < self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Slots<V>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Minute bucket of `now` as `YYYY-MM-DD-HH-mm`.
pub fn minute_bucket(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d-%H-%M").to_string()
}

/// `{token}-{minute bucket}-{params...}` joined by `-`.
pub fn response_key(token: &str, now: DateTime<Utc>, params: &[&str]) -> String {
    let mut key = format!("{}-{}", token.to_lowercase(), minute_bucket(now));
    for p in params {
        key.push('-');
        key.push_str(p);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;
    use std::sync::atomic::AtomicUsize;

    fn cache(cap: usize, ttl_secs: u64) -> ResponseCache<Vec<u8>> {
        ResponseCache::new(NonZeroUsize::new(cap).unwrap(), Duration::from_secs(ttl_secs))
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let c = cache(10, 300);
        c.insert("btc", vec![1, 2, 3]);
        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(c.get("btc"), Some(vec![1, 2, 3]));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(c.get("btc"), None);
        assert_eq!(c.stats().expired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reads_do_not_refresh_age() {
        let c = cache(10, 60);
        c.insert("eth", vec![9]);
        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(11)).await;
            assert!(c.get("eth").is_some());
        }
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(c.get("eth").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_recomputed() {
        let c = cache(10, 300);
        let calls = AtomicUsize::new(0);
        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![7u8])
        };
        c.get_or_compute("sol", compute).await.unwrap();
        c.get_or_compute("sol", compute).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        tokio::time::advance(Duration::from_secs(301)).await;
        c.get_or_compute("sol", compute).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn capacity_evicts_exactly_the_lru_entry() {
        let c = cache(DEFAULT_CAPACITY, 300);
        for i in 0..DEFAULT_CAPACITY {
            c.insert(&format!("k{i}"), vec![i as u8]);
        }
        // Touch k0 so k1 becomes least recently used.
        assert!(c.get("k0").is_some());
        c.get_or_compute("k500", || async { Ok(vec![0]) }).await.unwrap();
        assert_eq!(c.len(), DEFAULT_CAPACITY);
        assert!(c.get("k1").is_none());
        assert!(c.get("k0").is_some());
        assert!(c.get("k2").is_some());
        assert!(c.get("k500").is_some());
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let c = cache(10, 300);
        let err = c
            .get_or_compute("ada", || async { Err(Error::render("boom")) })
            .await
            .unwrap_err();
        assert_eq!(err, Error::Render("boom".into()));
        assert!(c.is_empty());
        let v = c.get_or_compute("ada", || async { Ok(vec![1]) }).await.unwrap();
        assert_eq!(v, vec![1]);
    }

    #[tokio::test]
    async fn failed_miss_keeps_existing_entries() {
        let c = cache(2, 300);
        c.insert("a", vec![1]);
        c.insert("b", vec![2]);
        let err = c.get_or_compute("c", || async { Err(Error::render("upstream down")) }).await;
        assert!(err.is_err());
        assert_eq!(c.get("a"), Some(vec![1]));
        assert_eq!(c.get("b"), Some(vec![2]));
        assert_eq!(c.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_compute_once() {
        let c = Arc::new(cache(10, 300));
        let calls = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let (c, calls) = (c.clone(), calls.clone());
                tokio::spawn(async move {
                    c.get_or_compute("dot", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(vec![4u8])
                    })
                    .await
                })
            })
            .collect();
        for t in tasks {
            assert_eq!(t.await.unwrap().unwrap(), vec![4]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn keys_bucket_by_minute() {
        let a = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 1).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 3, 9, 14, 6, 0).unwrap();
        assert_eq!(minute_bucket(a), "2024-03-09-14-05");
        assert_eq!(response_key("BTC", a, &["dark", "7", "large"]), "btc-2024-03-09-14-05-dark-7-large");
        assert_eq!(response_key("btc", a, &["dark"]), response_key("btc", b, &["dark"]));
        assert_ne!(response_key("btc", a, &["dark"]), response_key("btc", c, &["dark"]));
    }
}
