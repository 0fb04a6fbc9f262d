//! Core types for the Vitalgrid aggregation engine
//!
//! This module defines the data structures that flow through the engine:
//! tracked metric kinds, per-day metric values, sleep records, and the
//! per-day snapshot handed to downstream consumers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of quantity metrics tracked by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    HeartRate,
    RestingHeartRate,
    HeartRateVariability,
    HeartRateRecovery,
    Vo2Max,
    RespiratoryRate,
    ActiveEnergyBurned,
    BasalEnergyBurned,
    StepCount,
    ExerciseMinutes,
    StandHours,
}

/// How a metric's samples collapse into one value per calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyAggregation {
    /// Point-in-time physiological reading; the source's daily summary value
    /// is authoritative and is not re-aggregated here
    Representative,
    /// Cumulative quantity summed over the day
    Cumulative,
}

impl MetricKind {
    /// Every tracked metric, in collection order
    pub const ALL: [MetricKind; 11] = [
        MetricKind::HeartRate,
        MetricKind::RestingHeartRate,
        MetricKind::HeartRateVariability,
        MetricKind::HeartRateRecovery,
        MetricKind::Vo2Max,
        MetricKind::RespiratoryRate,
        MetricKind::ActiveEnergyBurned,
        MetricKind::BasalEnergyBurned,
        MetricKind::StepCount,
        MetricKind::ExerciseMinutes,
        MetricKind::StandHours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::HeartRate => "heart_rate",
            MetricKind::RestingHeartRate => "resting_heart_rate",
            MetricKind::HeartRateVariability => "heart_rate_variability",
            MetricKind::HeartRateRecovery => "heart_rate_recovery",
            MetricKind::Vo2Max => "vo2_max",
            MetricKind::RespiratoryRate => "respiratory_rate",
            MetricKind::ActiveEnergyBurned => "active_energy_burned",
            MetricKind::BasalEnergyBurned => "basal_energy_burned",
            MetricKind::StepCount => "step_count",
            MetricKind::ExerciseMinutes => "exercise_minutes",
            MetricKind::StandHours => "stand_hours",
        }
    }

    /// Canonical unit identifier for this metric
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::HeartRate
            | MetricKind::RestingHeartRate
            | MetricKind::HeartRateRecovery => "count/min",
            MetricKind::HeartRateVariability => "ms",
            MetricKind::Vo2Max => "mL/kg/min",
            MetricKind::RespiratoryRate => "count/min",
            MetricKind::ActiveEnergyBurned | MetricKind::BasalEnergyBurned => "kcal",
            MetricKind::StepCount => "count",
            MetricKind::ExerciseMinutes => "min",
            MetricKind::StandHours => "hour",
        }
    }

    /// Per-day aggregation policy for this metric
    pub fn aggregation(&self) -> DailyAggregation {
        match self {
            MetricKind::HeartRate
            | MetricKind::RestingHeartRate
            | MetricKind::HeartRateVariability
            | MetricKind::HeartRateRecovery
            | MetricKind::Vo2Max
            | MetricKind::RespiratoryRate => DailyAggregation::Representative,
            MetricKind::ActiveEnergyBurned
            | MetricKind::BasalEnergyBurned
            | MetricKind::StepCount
            | MetricKind::ExerciseMinutes
            | MetricKind::StandHours => DailyAggregation::Cumulative,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization state reported by the health data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    NotDetermined,
    Authorized,
    Denied,
    Restricted,
}

impl AuthorizationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationState::NotDetermined => "not_determined",
            AuthorizationState::Authorized => "authorized",
            AuthorizationState::Denied => "denied",
            AuthorizationState::Restricted => "restricted",
        }
    }
}

impl fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sleep stage classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStage {
    Rem,
    Core,
    Deep,
    Awake,
}

/// One stage-tagged sleep interval as reported by the data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepStageSample {
    pub stage: SleepStage,
    /// Interval start (UTC)
    pub start: DateTime<Utc>,
    /// Interval end (UTC)
    pub end: DateTime<Utc>,
}

impl SleepStageSample {
    /// Interval length in minutes; negative intervals count as zero
    pub fn duration_minutes(&self) -> f64 {
        ((self.end - self.start).num_seconds().max(0) as f64) / 60.0
    }
}

/// Reduced sleep data for one calendar day
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SleepSessionRecord {
    /// Earliest stage-sample start that day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedtime: Option<DateTime<Utc>>,
    /// Latest stage-sample end that day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<DateTime<Utc>>,
    /// Sum of all stage intervals, awake included (minutes)
    pub total_minutes: f64,
    pub rem_minutes: f64,
    pub core_minutes: f64,
    pub deep_minutes: f64,
    pub awake_minutes: f64,
    /// 1 − awake/total, clamped to [0, 1]; 0 when total is 0
    pub efficiency: f64,
}

/// Daily representative cardiovascular values, defaulting to 0 when absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CardioMetrics {
    /// Heart rate (bpm)
    pub heart_rate: f64,
    /// Resting heart rate (bpm)
    pub resting_heart_rate: f64,
    /// Heart rate variability (ms, SDNN)
    pub heart_rate_variability: f64,
    /// Post-exercise heart rate recovery (bpm)
    pub heart_rate_recovery: f64,
    /// VO2 max (mL/kg/min)
    pub vo2_max: f64,
    /// Respiratory rate (breaths per minute)
    pub respiratory_rate: f64,
}

/// Daily cumulative activity values, defaulting to 0 when absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetrics {
    /// Active energy burned (kcal)
    pub active_energy_burned: f64,
    /// Basal energy burned (kcal)
    pub basal_energy_burned: f64,
    /// Step count
    pub step_count: f64,
    /// Exercise minutes
    pub exercise_minutes: f64,
    /// Stand hours
    pub stand_hours: f64,
}

/// All tracked quantity-metric values for one calendar day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricValues {
    pub cardio: CardioMetrics,
    pub activity: ActivityMetrics,
}

impl DailyMetricValues {
    /// Assign one metric's daily value to its field
    pub fn set(&mut self, kind: MetricKind, value: f64) {
        match kind {
            MetricKind::HeartRate => self.cardio.heart_rate = value,
            MetricKind::RestingHeartRate => self.cardio.resting_heart_rate = value,
            MetricKind::HeartRateVariability => self.cardio.heart_rate_variability = value,
            MetricKind::HeartRateRecovery => self.cardio.heart_rate_recovery = value,
            MetricKind::Vo2Max => self.cardio.vo2_max = value,
            MetricKind::RespiratoryRate => self.cardio.respiratory_rate = value,
            MetricKind::ActiveEnergyBurned => self.activity.active_energy_burned = value,
            MetricKind::BasalEnergyBurned => self.activity.basal_energy_burned = value,
            MetricKind::StepCount => self.activity.step_count = value,
            MetricKind::ExerciseMinutes => self.activity.exercise_minutes = value,
            MetricKind::StandHours => self.activity.stand_hours = value,
        }
    }

    /// Read one metric's daily value back out
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::HeartRate => self.cardio.heart_rate,
            MetricKind::RestingHeartRate => self.cardio.resting_heart_rate,
            MetricKind::HeartRateVariability => self.cardio.heart_rate_variability,
            MetricKind::HeartRateRecovery => self.cardio.heart_rate_recovery,
            MetricKind::Vo2Max => self.cardio.vo2_max,
            MetricKind::RespiratoryRate => self.cardio.respiratory_rate,
            MetricKind::ActiveEnergyBurned => self.activity.active_energy_burned,
            MetricKind::BasalEnergyBurned => self.activity.basal_energy_burned,
            MetricKind::StepCount => self.activity.step_count,
            MetricKind::ExerciseMinutes => self.activity.exercise_minutes,
            MetricKind::StandHours => self.activity.stand_hours,
        }
    }
}

/// One normalized record per calendar day in a requested range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBiometricSnapshot {
    /// Calendar day this snapshot represents
    pub date: NaiveDate,
    pub cardio: CardioMetrics,
    pub sleep: SleepSessionRecord,
    pub activity: ActivityMetrics,
}

impl DailyBiometricSnapshot {
    /// An all-default snapshot for a day with no recorded data
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            cardio: CardioMetrics::default(),
            sleep: SleepSessionRecord::default(),
            activity: ActivityMetrics::default(),
        }
    }
}

/// One recorded workout as reported by the data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecord {
    /// Source-assigned identifier
    pub id: String,
    /// Activity name (e.g. "running", "strength_training")
    pub activity: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: f64,
    /// Active energy burned during the workout (kcal)
    pub active_energy_kcal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_heart_rate: Option<f64>,
}
