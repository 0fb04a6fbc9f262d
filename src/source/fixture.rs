//! JSON fixture data source
//!
//! Parses a fixture document of raw samples and serves it through the
//! [`BiometricSource`] trait. The fixture performs its own day bucketing the
//! way a platform statistics query would: cumulative metrics sum per day,
//! representative metrics take the day's last sample.
//!
//! Timestamps in the document are taken as already normalized by whoever
//! produced it; day bucketing uses their UTC date.

use crate::cache::DayValueMap;
use crate::error::BiometricError;
use crate::types::{
    AuthorizationState, DailyAggregation, MetricKind, SleepStageSample, WorkoutRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::BiometricSource;

/// One raw quantity sample in a fixture document
#[derive(Debug, Clone, Deserialize)]
struct QuantitySample {
    metric: MetricKind,
    timestamp: DateTime<Utc>,
    value: f64,
}

/// One workout entry in a fixture document
#[derive(Debug, Clone, Deserialize)]
struct FixtureWorkout {
    id: Option<String>,
    activity: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    active_energy_kcal: f64,
    average_heart_rate: Option<f64>,
}

/// Top-level fixture document
#[derive(Debug, Clone, Deserialize)]
struct FixtureDocument {
    #[serde(default = "default_available")]
    available: bool,
    #[serde(default = "default_authorization")]
    authorization: AuthorizationState,
    #[serde(default)]
    quantities: Vec<QuantitySample>,
    #[serde(default)]
    sleep: Vec<SleepStageSample>,
    #[serde(default)]
    workouts: Vec<FixtureWorkout>,
}

fn default_available() -> bool {
    true
}

fn default_authorization() -> AuthorizationState {
    AuthorizationState::Authorized
}

/// Fixture-backed data source
pub struct FixtureSource {
    document: FixtureDocument,
}

impl FixtureSource {
    /// Parse a fixture document from JSON
    pub fn from_json(raw_json: &str) -> Result<Self, BiometricError> {
        let document: FixtureDocument = serde_json::from_str(raw_json)?;
        Ok(Self { document })
    }

    /// Number of raw quantity samples in the document
    pub fn quantity_sample_count(&self) -> usize {
        self.document.quantities.len()
    }

    /// Number of sleep-stage samples in the document
    pub fn sleep_sample_count(&self) -> usize {
        self.document.sleep.len()
    }

    /// Number of workout entries in the document
    pub fn workout_count(&self) -> usize {
        self.document.workouts.len()
    }
}

#[async_trait]
impl BiometricSource for FixtureSource {
    fn is_available(&self) -> bool {
        self.document.available
    }

    fn authorization_state(&self) -> AuthorizationState {
        self.document.authorization
    }

    async fn request_authorization(&self) -> Result<AuthorizationState, BiometricError> {
        // The simulated user grants an undetermined prompt; a document
        // configured as denied or restricted stays that way.
        match self.document.authorization {
            AuthorizationState::NotDetermined => Ok(AuthorizationState::Authorized),
            state => Ok(state),
        }
    }

    async fn query_daily_quantities(
        &self,
        metric: MetricKind,
        unit: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DayValueMap, BiometricError> {
        if unit != metric.unit() {
            return Err(BiometricError::query(
                metric.as_str(),
                format!("unsupported unit {unit:?}, expected {:?}", metric.unit()),
            ));
        }

        let mut values = DayValueMap::new();
        match metric.aggregation() {
            DailyAggregation::Cumulative => {
                for sample in self.document.quantities.iter().filter(|s| s.metric == metric) {
                    let day = sample.timestamp.date_naive();
                    if day >= start && day <= end {
                        *values.entry(day).or_insert(0.0) += sample.value;
                    }
                }
            }
            DailyAggregation::Representative => {
                // Last sample of each day wins
                let mut latest: HashMap<NaiveDate, (DateTime<Utc>, f64)> = HashMap::new();
                for sample in self.document.quantities.iter().filter(|s| s.metric == metric) {
                    let day = sample.timestamp.date_naive();
                    if day < start || day > end {
                        continue;
                    }
                    match latest.get(&day) {
                        Some((seen, _)) if *seen >= sample.timestamp => {}
                        _ => {
                            latest.insert(day, (sample.timestamp, sample.value));
                        }
                    }
                }
                for (day, (_, value)) in latest {
                    values.insert(day, value);
                }
            }
        }
        Ok(values)
    }

    async fn query_sleep_samples(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SleepStageSample>, BiometricError> {
        Ok(self
            .document
            .sleep
            .iter()
            .filter(|sample| {
                let day = sample.start.date_naive();
                day >= start && day <= end
            })
            .cloned()
            .collect())
    }

    async fn query_workouts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkoutRecord>, BiometricError> {
        Ok(self
            .document
            .workouts
            .iter()
            .filter(|workout| {
                let day = workout.start.date_naive();
                day >= start && day <= end
            })
            .map(|workout| WorkoutRecord {
                id: workout
                    .id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                activity: workout.activity.clone(),
                start: workout.start,
                end: workout.end,
                duration_minutes: ((workout.end - workout.start).num_seconds().max(0) as f64)
                    / 60.0,
                active_energy_kcal: workout.active_energy_kcal,
                average_heart_rate: workout.average_heart_rate,
            })
            .collect())
    }
}
