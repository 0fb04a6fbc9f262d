//! Service orchestration
//!
//! [`BiometricService`] is the public entry point: it validates the requested
//! range, gates on availability and authorization, runs the metric collection
//! and the sleep reduction concurrently, and joins both into one gap-free
//! sequence of daily snapshots.

use crate::cache::{AggregationCache, CacheStats};
use crate::collector::MetricCollector;
use crate::error::BiometricError;
use crate::sleep::SleepSessionReducer;
use crate::source::{with_query_timeout, BiometricSource};
use crate::types::{
    AuthorizationState, DailyBiometricSnapshot, MetricKind, SleepSessionRecord, WorkoutRecord,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Caller-tunable service settings
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Upper bound on any single source query; disabled by default
    pub query_timeout: Option<Duration>,
}

/// Daily biometric aggregation service.
///
/// Owns its data source, aggregation cache, and configuration; nothing here
/// is ambient or process-global.
pub struct BiometricService {
    source: Arc<dyn BiometricSource>,
    cache: AggregationCache,
    config: ServiceConfig,
}

impl BiometricService {
    /// Create a service with default settings
    pub fn new(source: Arc<dyn BiometricSource>) -> Self {
        Self::with_config(source, ServiceConfig::default())
    }

    /// Create a service with explicit settings
    pub fn with_config(source: Arc<dyn BiometricSource>, config: ServiceConfig) -> Self {
        Self {
            source,
            cache: AggregationCache::new(),
            config,
        }
    }

    /// The cache this service owns; exposed for stats and test isolation
    pub fn cache(&self) -> &AggregationCache {
        &self.cache
    }

    /// One normalized snapshot per calendar day in the closed range
    /// [from, to]: exactly `(to − from).num_days() + 1` records, ascending,
    /// days without data zero-filled.
    pub async fn fetch_daily_biometrics(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyBiometricSnapshot>, BiometricError> {
        if from > to {
            return Err(BiometricError::InvalidRange {
                start: from,
                end: to,
            });
        }
        self.ensure_authorized().await?;

        let collector = MetricCollector::new(
            self.source.clone(),
            self.cache.clone(),
            self.config.query_timeout,
        );
        let (metric_days, sleep_days) =
            tokio::try_join!(collector.collect(from, to), self.fetch_sleep(from, to))?;

        let expected = (to - from).num_days() as usize + 1;
        let mut snapshots = Vec::with_capacity(expected);
        let mut day = from;
        loop {
            let mut snapshot = DailyBiometricSnapshot::empty(day);
            if let Some(values) = metric_days.get(&day) {
                snapshot.cardio = values.cardio;
                snapshot.activity = values.activity;
            }
            if let Some(sleep) = sleep_days.get(&day) {
                snapshot.sleep = sleep.clone();
            }
            snapshots.push(snapshot);

            if day == to {
                break;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        tracing::info!(%from, %to, days = snapshots.len(), "assembled daily biometrics");
        Ok(snapshots)
    }

    /// Recorded workouts in [from, to], sorted ascending by start time
    pub async fn fetch_historical_workouts(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkoutRecord>, BiometricError> {
        if from > to {
            return Err(BiometricError::InvalidRange {
                start: from,
                end: to,
            });
        }
        self.ensure_authorized().await?;

        let mut workouts = with_query_timeout(
            "workouts",
            self.config.query_timeout,
            self.source.query_workouts(from, to),
        )
        .await?;
        workouts.sort_by_key(|workout| workout.start);
        Ok(workouts)
    }

    /// Accept a new-data notification for one metric and drop its cached
    /// windows. Freshness hook only; correctness never depends on it.
    pub async fn handle_source_update(&self, metric: MetricKind) -> usize {
        self.cache.invalidate_metric(metric).await
    }

    /// Effectiveness counters for the owned cache
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Gate every operation on capability availability and authorization.
    /// The authorization state is queried once; an undetermined state gets
    /// exactly one request, with no retry after that.
    async fn ensure_authorized(&self) -> Result<(), BiometricError> {
        if !self.source.is_available() {
            return Err(BiometricError::NotAvailable);
        }

        let state = match self.source.authorization_state() {
            AuthorizationState::Authorized => return Ok(()),
            AuthorizationState::NotDetermined => {
                tracing::warn!("health data authorization undetermined, requesting access");
                self.source.request_authorization().await?
            }
            state => state,
        };

        match state {
            AuthorizationState::Authorized => Ok(()),
            state => Err(BiometricError::AuthorizationDenied { state }),
        }
    }

    async fn fetch_sleep(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<NaiveDate, SleepSessionRecord>, BiometricError> {
        let samples = with_query_timeout(
            "sleep_samples",
            self.config.query_timeout,
            self.source.query_sleep_samples(from, to),
        )
        .await?;
        Ok(SleepSessionReducer::reduce(&samples))
    }
}
