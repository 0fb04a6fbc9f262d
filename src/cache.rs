//! Aggregation cache
//!
//! Memoizes expensive day-bucketed aggregation queries keyed by
//! (metric, unit, window start, window end). Lookups are exact-match only:
//! all four key components must match, with no partial-window reuse.
//! Thread-safe via Tokio's async RwLock for concurrent access.

use crate::types::MetricKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-day numeric values for one metric over one window
pub type DayValueMap = HashMap<NaiveDate, f64>;

/// Cache key: every component must match exactly for a hit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    metric: MetricKind,
    unit: String,
    start: NaiveDate,
    end: NaiveDate,
}

/// Counters describing cache effectiveness
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// In-memory cache for per-day metric rollups.
///
/// Explicitly owned by the service that uses it; cloning shares the same
/// underlying store. Unbounded for the process lifetime; callers needing
/// isolation (tests) use [`AggregationCache::clear`].
#[derive(Debug, Clone, Default)]
pub struct AggregationCache {
    entries: Arc<RwLock<HashMap<CacheKey, Arc<DayValueMap>>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl AggregationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously stored window. Exact-match only.
    pub async fn lookup(
        &self,
        metric: MetricKind,
        unit: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Option<Arc<DayValueMap>> {
        let key = CacheKey {
            metric,
            unit: unit.to_string(),
            start,
            end,
        };
        let found = self.entries.read().await.get(&key).cloned();
        match &found {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(metric = %metric, %start, %end, "cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(metric = %metric, %start, %end, "cache miss");
            }
        }
        found
    }

    /// Store a window's per-day values, overwriting any entry for the key.
    pub async fn store(
        &self,
        metric: MetricKind,
        unit: &str,
        start: NaiveDate,
        end: NaiveDate,
        values: DayValueMap,
    ) {
        let key = CacheKey {
            metric,
            unit: unit.to_string(),
            start,
            end,
        };
        self.entries.write().await.insert(key, Arc::new(values));
    }

    /// Drop every cached window. Intended for test isolation.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Drop every cached window for one metric, returning how many were
    /// removed. Freshness hook for new-data notifications; correctness never
    /// depends on it.
    pub async fn invalidate_metric(&self, metric: MetricKind) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.metric != metric);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(metric = %metric, removed, "invalidated cached windows");
        }
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_window() -> DayValueMap {
        let mut values = DayValueMap::new();
        values.insert(date(2024, 1, 15), 62.0);
        values.insert(date(2024, 1, 16), 64.5);
        values
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let cache = AggregationCache::new();
        let (start, end) = (date(2024, 1, 15), date(2024, 1, 16));

        assert!(cache
            .lookup(MetricKind::HeartRate, "count/min", start, end)
            .await
            .is_none());

        cache
            .store(MetricKind::HeartRate, "count/min", start, end, sample_window())
            .await;

        let found = cache
            .lookup(MetricKind::HeartRate, "count/min", start, end)
            .await
            .expect("stored window should be found");
        assert_eq!(found.get(&date(2024, 1, 15)), Some(&62.0));

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_exact_match_only() {
        let cache = AggregationCache::new();
        let (start, end) = (date(2024, 1, 15), date(2024, 1, 20));
        cache
            .store(MetricKind::StepCount, "count", start, end, sample_window())
            .await;

        // Different window, unit, or metric must all miss
        assert!(cache
            .lookup(MetricKind::StepCount, "count", start, date(2024, 1, 19))
            .await
            .is_none());
        assert!(cache
            .lookup(MetricKind::StepCount, "min", start, end)
            .await
            .is_none());
        assert!(cache
            .lookup(MetricKind::ExerciseMinutes, "count", start, end)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let cache = AggregationCache::new();
        let (start, end) = (date(2024, 1, 15), date(2024, 1, 15));

        let mut first = DayValueMap::new();
        first.insert(date(2024, 1, 15), 100.0);
        cache
            .store(MetricKind::StepCount, "count", start, end, first)
            .await;

        let mut second = DayValueMap::new();
        second.insert(date(2024, 1, 15), 250.0);
        cache
            .store(MetricKind::StepCount, "count", start, end, second)
            .await;

        let found = cache
            .lookup(MetricKind::StepCount, "count", start, end)
            .await
            .unwrap();
        assert_eq!(found.get(&date(2024, 1, 15)), Some(&250.0));
        assert_eq!(cache.stats().await.entries, 1);
    }

    #[tokio::test]
    async fn test_clear_and_invalidate_metric() {
        let cache = AggregationCache::new();
        let (start, end) = (date(2024, 1, 1), date(2024, 1, 7));
        cache
            .store(MetricKind::HeartRate, "count/min", start, end, sample_window())
            .await;
        cache
            .store(MetricKind::StepCount, "count", start, end, sample_window())
            .await;
        cache
            .store(
                MetricKind::HeartRate,
                "count/min",
                start,
                date(2024, 1, 14),
                sample_window(),
            )
            .await;

        let removed = cache.invalidate_metric(MetricKind::HeartRate).await;
        assert_eq!(removed, 2);
        assert!(cache
            .lookup(MetricKind::StepCount, "count", start, end)
            .await
            .is_some());

        cache.clear().await;
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_keys_never_lost() {
        let cache = AggregationCache::new();
        let mut handles = Vec::new();

        // N concurrent stores on N distinct keys
        for i in 0..64u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let day = date(2024, 1, 1) + chrono::Duration::days(i64::from(i));
                let mut values = DayValueMap::new();
                values.insert(day, f64::from(i));
                cache
                    .store(MetricKind::StepCount, "count", day, day, values)
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Every entry is present and matches what was stored
        for i in 0..64u32 {
            let day = date(2024, 1, 1) + chrono::Duration::days(i64::from(i));
            let found = cache
                .lookup(MetricKind::StepCount, "count", day, day)
                .await
                .expect("entry lost under concurrent stores");
            assert_eq!(found.get(&day), Some(&f64::from(i)));
        }
        assert_eq!(cache.stats().await.entries, 64);
    }
}
