//! Process-wide history cache with age-based expiry.
//!
//! Key: `(ticker, start, end)`. Value: the fetched `PriceSeries`.
//!
//! - get-or-populate: the first miss for a key runs the fetch; concurrent
//!   callers for the same key wait on that key's slot instead of fetching again.
//! - Entries expire `ttl` after they were stored and are refetched on the next access.
//! - Only successful fetches are stored (an empty series is a success).
//!   Errors pass through and the next access retries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info};

use super::provider::{DataError, HistoryProvider};
use crate::domain::PriceSeries;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CacheKey {
    pub fn new(ticker: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start,
            end,
        }
    }
}

#[derive(Debug)]
struct CachedEntry {
    series: Arc<PriceSeries>,
    stored_at: Instant,
}

/// One key's storage. Its mutex is held for the duration of a fetch.
type Slot = Mutex<Option<CachedEntry>>;

#[derive(Debug)]
pub struct HistoryCache {
    ttl: Duration,
    slots: Mutex<HashMap<CacheKey, Arc<Slot>>>,
}

impl HistoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached series for `key`, or run `fetch` and store its result.
    pub fn get_or_populate<F>(&self, key: &CacheKey, fetch: F) -> Result<Arc<PriceSeries>, DataError>
    where
        F: FnOnce() -> Result<PriceSeries, DataError>,
    {
        let slot = self.slot_for(key);
        let mut entry = lock(&slot);

        if let Some(cached) = entry.as_ref() {
            if cached.stored_at.elapsed() < self.ttl {
                debug!(ticker = %key.ticker, "history cache hit");
                return Ok(Arc::clone(&cached.series));
            }
            debug!(ticker = %key.ticker, "history cache entry expired");
        } else {
            debug!(ticker = %key.ticker, "history cache miss");
        }

        let series = Arc::new(fetch()?);
        *entry = Some(CachedEntry {
            series: Arc::clone(&series),
            stored_at: Instant::now(),
        });
        Ok(series)
    }

    /// Number of keys currently holding a value, fresh or stale.
    pub fn len(&self) -> usize {
        lock(&self.slots)
            .values()
            .filter(|slot| lock(slot).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired or empty slots that no caller is using.
    pub fn evict_expired(&self) -> usize {
        let mut slots = lock(&self.slots);
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            lock(slot)
                .as_ref()
                .is_some_and(|e| e.stored_at.elapsed() < self.ttl)
        });
        let evicted = before - slots.len();
        if evicted > 0 {
            info!(evicted, "evicted expired history cache entries");
        }
        evicted
    }

    fn slot_for(&self, key: &CacheKey) -> Arc<Slot> {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// A `HistoryProvider` decorated with a `HistoryCache`.
pub struct CachedHistory {
    inner: Arc<dyn HistoryProvider>,
    cache: HistoryCache,
}

impl CachedHistory {
    pub fn new(inner: Arc<dyn HistoryProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: HistoryCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }
}

impl HistoryProvider for CachedHistory {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        self.cache.evict_expired();
        let key = CacheKey::new(ticker, start, end);
        let series = self
            .cache
            .get_or_populate(&key, || self.inner.fetch_history(ticker, start, end))?;
        Ok(PriceSeries::clone(&series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn key() -> CacheKey {
        CacheKey::new(
            "TSLA",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    struct CountingProvider {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail: false,
            }
        }
    }

    impl HistoryProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn fetch_history(
            &self,
            ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<PriceSeries, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            if self.fail {
                return Err(DataError::NetworkUnreachable("offline".into()));
            }
            Ok(PriceSeries::empty(ticker))
        }
    }

    #[test]
    fn second_call_hits_cache() {
        let cache = HistoryCache::new(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            cache
                .get_or_populate(&key(), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(PriceSeries::empty("TSLA"))
                })
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_fetch_separately() {
        let cache = HistoryCache::new(Duration::from_secs(3600));
        let mut other = key();
        other.ticker = "AAPL".into();
        cache.get_or_populate(&key(), || Ok(PriceSeries::empty("TSLA"))).unwrap();
        cache.get_or_populate(&other, || Ok(PriceSeries::empty("AAPL"))).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn expired_entry_is_refetched() {
        let cache = HistoryCache::new(Duration::from_millis(10));
        let calls = AtomicUsize::new(0);
        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(PriceSeries::empty("TSLA"))
        };
        cache.get_or_populate(&key(), fetch).unwrap();
        thread::sleep(Duration::from_millis(15));
        cache.get_or_populate(&key(), fetch).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let provider = Arc::new(CountingProvider {
            fail: true,
            ..CountingProvider::new()
        });
        let cached = CachedHistory::new(provider.clone(), Duration::from_secs(3600));
        let k = key();
        assert!(cached.fetch_history(&k.ticker, k.start, k.end).is_err());
        assert!(cached.fetch_history(&k.ticker, k.start, k.end).is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(cached.cache().is_empty());
    }

    #[test]
    fn concurrent_callers_share_one_fetch() {
        let provider = Arc::new(CountingProvider {
            delay: Duration::from_millis(50),
            ..CountingProvider::new()
        });
        let cached = Arc::new(CachedHistory::new(provider.clone(), Duration::from_secs(3600)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cached = Arc::clone(&cached);
                thread::spawn(move || {
                    let k = key();
                    cached.fetch_history(&k.ticker, k.start, k.end).map(|s| s.len())
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().unwrap(), 0);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn evict_removes_stale_entries() {
        let cache = HistoryCache::new(Duration::from_millis(10));
        cache.get_or_populate(&key(), || Ok(PriceSeries::empty("TSLA"))).unwrap();
        thread::sleep(Duration::from_millis(15));
        assert_eq!(cache.evict_expired(), 1);
        assert!(cache.is_empty());
    }
}
