//! In-memory TTL cache for weather lookups.
//!
//! Entries are keyed by coordinates rounded to three decimals (~100 m), so
//! nearby lookups share one upstream fetch. Expired entries are dropped
//! lazily: only a `get` on the stale key removes it. `stats` never evicts.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default freshness window
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Source of "now" for the cache.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall-clock time via `Instant::now()`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Coordinates bucketed to thousandths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    lat_milli: i64,
    lon_milli: i64,
}

impl CacheKey {
    /// Round both coordinates to 3 decimals from their exact binary value,
    /// so `1.0005` (stored just below the half) lands on `1.000`.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat_milli: to_milli(lat),
            lon_milli: to_milli(lon),
        }
    }
}

fn to_milli(deg: f64) -> i64 {
    // `{:.3}` rounds the exact value; scaling first would round twice
    let digits: String = format!("{:.3}", deg).chars().filter(|c| *c != '.').collect();
    // NaN, infinities and out-of-range values: `as` saturates and maps NaN to 0
    digits.parse().unwrap_or((deg * 1000.0).round() as i64)
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3}_{:.3}",
            self.lat_milli as f64 / 1000.0,
            self.lon_milli as f64 / 1000.0
        )
    }
}

/// A stored weather payload and its rendered text
#[derive(Debug)]
pub struct CacheEntry {
    raw: Value,
    rendered: String,
    stored_at: Instant,
}

impl CacheEntry {
    /// Payload exactly as fetched upstream
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Display text supplied by the caller at insertion
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn stored_at(&self) -> Instant {
        self.stored_at
    }
}

/// A fresh entry returned by [`WeatherCache::get`]
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub entry: Arc<CacheEntry>,
    /// Time since the entry was stored
    pub age: Duration,
    ttl: Duration,
}

impl CacheHit {
    /// Time left before the entry expires
    pub fn fresh_for(&self) -> Duration {
        self.ttl.saturating_sub(self.age)
    }
}

/// Snapshot returned by [`WeatherCache::stats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: usize,
    /// Present keys, sorted
    pub keys: Vec<CacheKey>,
}

/// Time-bounded map from coordinate bucket to weather payload.
///
/// Shared behind an `Arc`; the map is guarded by a mutex that is never held
/// across an await point. Two concurrent misses on the same key both fetch
/// and the later `set` wins.
#[derive(Debug)]
pub struct WeatherCache {
    entries: Mutex<HashMap<CacheKey, Arc<CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Build a cache from a TTL expressed in minutes, as stored in config
    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(Duration::from_secs(u64::from(minutes) * 60))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        tracing::info!("Weather cache initialized ({} min TTL)", ttl.as_secs() / 60);
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key for a coordinate pair
    pub fn key_for(lat: f64, lon: f64) -> CacheKey {
        CacheKey::new(lat, lon)
    }

    /// Look up a fresh entry.
    ///
    /// An entry whose age has reached the TTL is removed and reported as a
    /// miss.
    pub fn get(&self, lat: f64, lon: f64) -> Option<CacheHit> {
        let key = Self::key_for(lat, lon);
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let entry = match entries.get(&key) {
            Some(entry) => Arc::clone(entry),
            None => {
                tracing::debug!("Cache MISS for {}", key);
                return None;
            }
        };

        let age = now.saturating_duration_since(entry.stored_at);
        if age < self.ttl {
            tracing::debug!("Cache HIT for {} (age: {}s)", key, age.as_secs());
            Some(CacheHit {
                entry,
                age,
                ttl: self.ttl,
            })
        } else {
            entries.remove(&key);
            tracing::debug!("Cache EXPIRED for {} (age: {}s)", key, age.as_secs());
            None
        }
    }

    /// Store a payload, replacing any entry for the same bucket and
    /// restarting its clock.
    pub fn set(&self, lat: f64, lon: f64, raw: Value, rendered: impl Into<String>) {
        let key = Self::key_for(lat, lon);
        let entry = Arc::new(CacheEntry {
            raw,
            rendered: rendered.into(),
            stored_at: self.clock.now(),
        });

        let mut entries = self.entries.lock();
        entries.insert(key, entry);
        tracing::info!("Cached weather for {} (total cached: {})", key, entries.len());
    }

    /// Drop every entry, returning how many there were
    pub fn clear(&self) -> usize {
        let removed = std::mem::take(&mut *self.entries.lock());
        tracing::info!("Cleared {} cache entries", removed.len());
        removed.len()
    }

    /// Entry count and keys, including entries that have expired but were
    /// not yet touched by `get`.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let mut keys: Vec<CacheKey> = entries.keys().copied().collect();
        keys.sort();
        CacheStats {
            entry_count: entries.len(),
            keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Clock that only moves when told to
    #[derive(Debug)]
    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Instant::now()),
            })
        }

        fn advance(&self, by: Duration) {
            *self.now.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock()
        }
    }

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    fn cache_with_clock() -> (WeatherCache, Arc<ManualClock>) {
        let clock = ManualClock::new();
        let cache = WeatherCache::with_clock(DEFAULT_TTL, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_key_buckets_nearby_coordinates() {
        assert_eq!(
            WeatherCache::key_for(52.1234, 6.3456),
            WeatherCache::key_for(52.1231, 6.3459)
        );
        assert_eq!(
            WeatherCache::key_for(52.12349, 6.34549),
            WeatherCache::key_for(52.1226, 6.3446)
        );
    }

    #[test]
    fn test_key_separates_third_decimal() {
        assert_ne!(
            WeatherCache::key_for(52.123, 6.345),
            WeatherCache::key_for(52.124, 6.345)
        );
        assert_ne!(
            WeatherCache::key_for(52.123, 6.345),
            WeatherCache::key_for(52.123, 6.346)
        );
    }

    #[test]
    fn test_key_display() {
        assert_eq!(WeatherCache::key_for(52.1234, 6.3456).to_string(), "52.123_6.346");
        assert_eq!(WeatherCache::key_for(52.0, 6.0).to_string(), "52.000_6.000");
        assert_eq!(WeatherCache::key_for(-33.8688, 151.2093).to_string(), "-33.869_151.209");
    }

    #[test]
    fn test_key_rounds_exact_value_at_half() {
        // Both literals are stored slightly below the half
        assert_eq!(WeatherCache::key_for(1.0005, 0.0), WeatherCache::key_for(1.0, 0.0));
        assert_eq!(
            WeatherCache::key_for(52.1235, 0.0),
            WeatherCache::key_for(52.123, 0.0)
        );
        assert_eq!(WeatherCache::key_for(52.1235, 0.0).to_string(), "52.123_0.000");
        // Stored slightly above the half
        assert_eq!(WeatherCache::key_for(2.6745, 0.0).to_string(), "2.675_0.000");
    }

    #[test]
    fn test_key_non_finite_does_not_panic() {
        assert_eq!(WeatherCache::key_for(f64::NAN, 0.0), WeatherCache::key_for(0.0, 0.0));
        assert_ne!(WeatherCache::key_for(f64::INFINITY, 0.0), WeatherCache::key_for(0.0, 0.0));
    }

    #[test]
    fn test_negative_zero_shares_bucket_with_zero() {
        assert_eq!(WeatherCache::key_for(-0.0001, 0.0), WeatherCache::key_for(0.0, 0.0));
    }

    #[test]
    fn test_fresh_hit() {
        let (cache, _clock) = cache_with_clock();
        let data = json!({ "current": { "temperature_2m": 11.0 } });

        cache.set(52.0, 6.0, data.clone(), "X");
        let hit = cache.get(52.0, 6.0).unwrap();

        assert_eq!(hit.entry.raw(), &data);
        assert_eq!(hit.entry.rendered(), "X");
        assert_eq!(hit.age, Duration::ZERO);
        assert_eq!(hit.fresh_for(), DEFAULT_TTL);
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn test_hit_reports_age() {
        let (cache, clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "X");

        clock.advance(minutes(4));
        let hit = cache.get(52.0, 6.0).unwrap();
        assert_eq!(hit.age, minutes(4));
        assert_eq!(hit.fresh_for(), minutes(11));
    }

    #[test]
    fn test_expired_entry_is_evicted_on_get() {
        let (cache, clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "X");

        clock.advance(minutes(15) + Duration::from_secs(1));
        assert!(cache.get(52.0, 6.0).is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_age_equal_to_ttl_is_a_miss() {
        let (cache, clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "X");

        clock.advance(DEFAULT_TTL);
        assert!(cache.get(52.0, 6.0).is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_just_before_ttl_is_a_hit() {
        let (cache, clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "X");

        clock.advance(DEFAULT_TTL - Duration::from_millis(1));
        assert!(cache.get(52.0, 6.0).is_some());
    }

    #[test]
    fn test_stats_does_not_evict() {
        let (cache, clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "X");

        clock.advance(minutes(16));
        let stats = cache.stats();
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.keys, vec![WeatherCache::key_for(52.0, 6.0)]);

        assert!(cache.get(52.0, 6.0).is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_overwrite_resets_clock() {
        let (cache, clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({ "v": 1 }), "D1");

        clock.advance(minutes(10));
        cache.set(52.0, 6.0, json!({ "v": 2 }), "D2");

        clock.advance(minutes(6));
        let hit = cache.get(52.0, 6.0).unwrap();
        assert_eq!(hit.entry.raw(), &json!({ "v": 2 }));
        assert_eq!(hit.entry.rendered(), "D2");
        assert_eq!(hit.age, minutes(6));
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn test_set_on_nearby_coordinates_overwrites() {
        let (cache, _clock) = cache_with_clock();
        cache.set(52.1234, 6.3456, json!({}), "first");
        cache.set(52.1231, 6.3459, json!({}), "second");

        assert_eq!(cache.stats().entry_count, 1);
        assert_eq!(cache.get(52.1233, 6.3457).unwrap().entry.rendered(), "second");
    }

    #[test]
    fn test_clear_returns_count() {
        let (cache, _clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "a");
        cache.set(51.0, 5.0, json!({}), "b");
        cache.set(50.0, 4.0, json!({}), "c");

        assert_eq!(cache.clear(), 3);
        assert_eq!(cache.stats().entry_count, 0);
        assert_eq!(cache.clear(), 0);
    }

    #[test]
    fn test_clear_counts_expired_entries() {
        let (cache, clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "a");
        clock.advance(minutes(30));
        assert_eq!(cache.clear(), 1);
    }

    #[test]
    fn test_idempotent_miss() {
        let (cache, _clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "a");

        assert!(cache.get(10.0, 10.0).is_none());
        assert!(cache.get(10.0, 10.0).is_none());
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn test_stats_keys_are_sorted() {
        let (cache, _clock) = cache_with_clock();
        cache.set(53.0, 6.0, json!({}), "a");
        cache.set(51.0, 5.0, json!({}), "b");
        cache.set(52.0, 4.0, json!({}), "c");

        let keys: Vec<String> = cache.stats().keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["51.000_5.000", "52.000_4.000", "53.000_6.000"]);
    }

    #[test]
    fn test_hit_shares_entry_without_copying() {
        let (cache, _clock) = cache_with_clock();
        cache.set(52.0, 6.0, json!({}), "X");

        let a = cache.get(52.0, 6.0).unwrap();
        let b = cache.get(52.0, 6.0).unwrap();
        assert!(Arc::ptr_eq(&a.entry, &b.entry));
    }

    #[test]
    fn test_from_minutes() {
        assert_eq!(WeatherCache::from_minutes(15).ttl(), DEFAULT_TTL);
        assert_eq!(WeatherCache::default().ttl(), DEFAULT_TTL);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(WeatherCache::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.set(50.0 + i as f64, 5.0, json!({ "i": i }), format!("{i}"));
                    cache.get(50.0 + i as f64, 5.0).is_some()
                })
            })
            .collect();

        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(cache.stats().entry_count, 8);
    }
}
