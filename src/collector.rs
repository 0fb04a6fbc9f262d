//! Metric collection
//!
//! Fetches one summary value per calendar day for every tracked quantity
//! metric over a date range. Each metric checks the aggregation cache first
//! and stores the fetched window on a miss. All per-metric fetches run
//! concurrently; the first failure aborts the whole collection and its
//! sibling fetches are dropped. Because of that fail-fast policy, a 0 in the
//! output always means "no data recorded", never a silently zero-filled
//! query failure.

use crate::cache::{AggregationCache, DayValueMap};
use crate::error::BiometricError;
use crate::source::{with_query_timeout, BiometricSource};
use crate::types::{DailyMetricValues, MetricKind};
use chrono::NaiveDate;
use futures_util::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Cache-first collector over the fixed tracked-metric set
pub struct MetricCollector {
    source: Arc<dyn BiometricSource>,
    cache: AggregationCache,
    query_timeout: Option<Duration>,
}

impl MetricCollector {
    pub fn new(
        source: Arc<dyn BiometricSource>,
        cache: AggregationCache,
        query_timeout: Option<Duration>,
    ) -> Self {
        Self {
            source,
            cache,
            query_timeout,
        }
    }

    /// Collect every tracked metric over the closed range [start, end].
    ///
    /// Returns one [`DailyMetricValues`] per day the source reported for at
    /// least one metric; days absent from every metric's window are absent
    /// here too (the joiner fills defaults).
    pub async fn collect(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<NaiveDate, DailyMetricValues>, BiometricError> {
        if start > end {
            return Err(BiometricError::InvalidRange { start, end });
        }

        let fetches = MetricKind::ALL
            .iter()
            .map(|&kind| self.fetch_metric(kind, start, end));
        let per_metric = try_join_all(fetches).await?;

        let mut days: HashMap<NaiveDate, DailyMetricValues> = HashMap::new();
        for (kind, window) in per_metric {
            for (&day, &value) in window.iter() {
                days.entry(day).or_default().set(kind, value);
            }
        }
        Ok(days)
    }

    /// One metric's window: cache lookup, then source query + store on miss
    async fn fetch_metric(
        &self,
        kind: MetricKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(MetricKind, Arc<DayValueMap>), BiometricError> {
        let unit = kind.unit();
        if let Some(window) = self.cache.lookup(kind, unit, start, end).await {
            return Ok((kind, window));
        }

        let window = with_query_timeout(
            kind.as_str(),
            self.query_timeout,
            self.source.query_daily_quantities(kind, unit, start, end),
        )
        .await?;

        self.cache.store(kind, unit, start, end, window.clone()).await;
        Ok((kind, Arc::new(window)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthorizationState, SleepStageSample, WorkoutRecord};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub source with a per-call counter and one optionally failing metric
    struct StubSource {
        quantity_calls: AtomicUsize,
        failing_metric: Option<MetricKind>,
        slow: bool,
    }

    impl StubSource {
        fn new() -> Self {
            Self {
                quantity_calls: AtomicUsize::new(0),
                failing_metric: None,
                slow: false,
            }
        }

        fn failing(metric: MetricKind) -> Self {
            Self {
                failing_metric: Some(metric),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.quantity_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BiometricSource for StubSource {
        fn is_available(&self) -> bool {
            true
        }

        fn authorization_state(&self) -> AuthorizationState {
            AuthorizationState::Authorized
        }

        async fn request_authorization(&self) -> Result<AuthorizationState, BiometricError> {
            Ok(AuthorizationState::Authorized)
        }

        async fn query_daily_quantities(
            &self,
            metric: MetricKind,
            _unit: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<DayValueMap, BiometricError> {
            self.quantity_calls.fetch_add(1, Ordering::SeqCst);
            if self.slow {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if self.failing_metric == Some(metric) {
                return Err(BiometricError::query(metric.as_str(), "stub failure"));
            }
            let mut window = DayValueMap::new();
            window.insert(start, 42.0);
            Ok(window)
        }

        async fn query_sleep_samples(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<SleepStageSample>, BiometricError> {
            Ok(Vec::new())
        }

        async fn query_workouts(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<WorkoutRecord>, BiometricError> {
            Ok(Vec::new())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_collects_every_tracked_metric() {
        let source = Arc::new(StubSource::new());
        let collector =
            MetricCollector::new(source.clone(), AggregationCache::new(), None);

        let days = collector
            .collect(date(2024, 1, 15), date(2024, 1, 15))
            .await
            .unwrap();

        assert_eq!(source.calls(), MetricKind::ALL.len());
        let values = &days[&date(2024, 1, 15)];
        for kind in MetricKind::ALL {
            assert_eq!(values.get(kind), 42.0);
        }
    }

    #[tokio::test]
    async fn test_second_collection_is_served_from_cache() {
        let source = Arc::new(StubSource::new());
        let cache = AggregationCache::new();
        let collector = MetricCollector::new(source.clone(), cache.clone(), None);

        let first = collector
            .collect(date(2024, 1, 15), date(2024, 1, 21))
            .await
            .unwrap();
        assert_eq!(source.calls(), MetricKind::ALL.len());

        let second = collector
            .collect(date(2024, 1, 15), date(2024, 1, 21))
            .await
            .unwrap();
        // No new source queries, identical values
        assert_eq!(source.calls(), MetricKind::ALL.len());
        assert_eq!(first, second);

        // A different window is a fresh set of queries
        collector
            .collect(date(2024, 1, 15), date(2024, 1, 22))
            .await
            .unwrap();
        assert_eq!(source.calls(), 2 * MetricKind::ALL.len());
    }

    #[tokio::test]
    async fn test_one_failing_metric_aborts_collection() {
        let source = Arc::new(StubSource::failing(MetricKind::Vo2Max));
        let collector = MetricCollector::new(source, AggregationCache::new(), None);

        let result = collector
            .collect(date(2024, 1, 15), date(2024, 1, 15))
            .await;
        assert!(matches!(
            result,
            Err(BiometricError::DataSourceQuery { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_range_issues_no_queries() {
        let source = Arc::new(StubSource::new());
        let collector =
            MetricCollector::new(source.clone(), AggregationCache::new(), None);

        let result = collector
            .collect(date(2024, 1, 16), date(2024, 1, 15))
            .await;
        assert!(matches!(result, Err(BiometricError::InvalidRange { .. })));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_timeout() {
        let source = Arc::new(StubSource {
            slow: true,
            ..StubSource::new()
        });
        let collector = MetricCollector::new(
            source,
            AggregationCache::new(),
            Some(Duration::from_secs(1)),
        );

        let result = collector
            .collect(date(2024, 1, 15), date(2024, 1, 15))
            .await;
        assert!(matches!(result, Err(BiometricError::QueryTimeout { .. })));
    }
}
