//! Health data source capability
//!
//! This module defines the trait boundary to the external health data source
//! (platform health store, vendor API, or a JSON fixture) and the shipped
//! fixture-backed implementation.

mod fixture;

pub use fixture::FixtureSource;

use crate::cache::DayValueMap;
use crate::error::BiometricError;
use crate::types::{AuthorizationState, MetricKind, SleepStageSample, WorkoutRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::future::Future;
use std::time::Duration;

/// Capability contract for a health data source.
///
/// Implementations own any platform specifics: local-midnight normalization
/// of timestamps, the statistic backing a `Representative` metric's daily
/// summary, and incremental anchors. The engine treats returned daily values
/// as authoritative and never re-aggregates them.
#[async_trait]
pub trait BiometricSource: Send + Sync {
    /// Whether the health-data capability exists on this host at all
    fn is_available(&self) -> bool;

    /// Current authorization state, queried once per engine operation
    fn authorization_state(&self) -> AuthorizationState;

    /// Ask the platform for access. Called at most once per engine operation,
    /// and only from the `NotDetermined` state.
    async fn request_authorization(&self) -> Result<AuthorizationState, BiometricError>;

    /// Day-bucketed summary values for one metric over the closed range
    /// [start, end]. Days without data are absent from the map.
    async fn query_daily_quantities(
        &self,
        metric: MetricKind,
        unit: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DayValueMap, BiometricError>;

    /// Raw stage-tagged sleep intervals whose start day falls in [start, end]
    async fn query_sleep_samples(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SleepStageSample>, BiometricError>;

    /// Recorded workouts whose start day falls in [start, end]
    async fn query_workouts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkoutRecord>, BiometricError>;
}

/// Run a source query under the configured per-query timeout, if any
pub(crate) async fn with_query_timeout<T, F>(
    what: &str,
    limit: Option<Duration>,
    query: F,
) -> Result<T, BiometricError>
where
    F: Future<Output = Result<T, BiometricError>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, query).await {
            Ok(result) => result,
            Err(_) => Err(BiometricError::QueryTimeout {
                what: what.to_string(),
            }),
        },
        None => query.await,
    }
}
