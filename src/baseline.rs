//! Baseline tracking
//!
//! Maintains rolling baselines for HRV, resting heart rate, and sleep
//! metrics across consecutive daily snapshots. Baselines enable relative
//! interpretation of a day's values by downstream recovery and insight
//! consumers.
//!
//! A value of 0 in a snapshot means "no data recorded" (the engine's
//! fail-fast fetch policy guarantees this), so zero values are skipped
//! rather than dragged into the rolling averages.

use crate::types::DailyBiometricSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default baseline window in days
pub const DEFAULT_BASELINE_WINDOW: usize = 14;

/// Rolling baseline values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Baselines {
    /// Baseline HRV (rolling average, ms)
    pub hrv_ms: Option<f64>,
    /// Baseline resting HR (rolling average, bpm)
    pub resting_hr_bpm: Option<f64>,
    /// Baseline total sleep (rolling average, minutes)
    pub sleep_minutes: Option<f64>,
    /// Baseline sleep efficiency (rolling average, 0-1)
    pub sleep_efficiency: Option<f64>,
    /// Number of days contributing to the widest window
    pub days: u32,
}

/// Percentage deviations of one day's values from the baseline that stood
/// before that day was observed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineDeviation {
    pub hrv_pct: Option<f64>,
    pub resting_hr_pct: Option<f64>,
    pub sleep_duration_pct: Option<f64>,
}

/// Rolling-window tracker fed by daily snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineTracker {
    hrv_values: VecDeque<f64>,
    rhr_values: VecDeque<f64>,
    sleep_duration_values: VecDeque<f64>,
    sleep_efficiency_values: VecDeque<f64>,
    window_size: usize,
}

impl Default for BaselineTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_WINDOW)
    }
}

impl BaselineTracker {
    /// Create a tracker with the given window size in days
    pub fn new(window_size: usize) -> Self {
        Self {
            hrv_values: VecDeque::with_capacity(window_size),
            rhr_values: VecDeque::with_capacity(window_size),
            sleep_duration_values: VecDeque::with_capacity(window_size),
            sleep_efficiency_values: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Fold one day's snapshot into the rolling windows and return the
    /// day's deviation from the baseline as it stood before the update.
    pub fn observe(&mut self, snapshot: &DailyBiometricSnapshot) -> BaselineDeviation {
        let before = self.baselines();

        let deviation = BaselineDeviation {
            hrv_pct: deviation_pct(
                nonzero(snapshot.cardio.heart_rate_variability),
                before.hrv_ms,
            ),
            resting_hr_pct: deviation_pct(
                nonzero(snapshot.cardio.resting_heart_rate),
                before.resting_hr_bpm,
            ),
            sleep_duration_pct: deviation_pct(
                nonzero(snapshot.sleep.total_minutes),
                before.sleep_minutes,
            ),
        };

        if let Some(hrv) = nonzero(snapshot.cardio.heart_rate_variability) {
            push_rolling(&mut self.hrv_values, hrv, self.window_size);
        }
        if let Some(rhr) = nonzero(snapshot.cardio.resting_heart_rate) {
            push_rolling(&mut self.rhr_values, rhr, self.window_size);
        }
        if let Some(sleep) = nonzero(snapshot.sleep.total_minutes) {
            push_rolling(&mut self.sleep_duration_values, sleep, self.window_size);
            push_rolling(
                &mut self.sleep_efficiency_values,
                snapshot.sleep.efficiency,
                self.window_size,
            );
        }

        deviation
    }

    /// Current rolling baselines
    pub fn baselines(&self) -> Baselines {
        Baselines {
            hrv_ms: rolling_average(&self.hrv_values),
            resting_hr_bpm: rolling_average(&self.rhr_values),
            sleep_minutes: rolling_average(&self.sleep_duration_values),
            sleep_efficiency: rolling_average(&self.sleep_efficiency_values),
            days: self
                .hrv_values
                .len()
                .max(self.rhr_values.len())
                .max(self.sleep_duration_values.len()) as u32,
        }
    }

    /// Load tracker state from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize tracker state to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn nonzero(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

fn push_rolling(queue: &mut VecDeque<f64>, value: f64, window_size: usize) {
    queue.push_back(value);
    while queue.len() > window_size {
        queue.pop_front();
    }
}

fn rolling_average(values: &VecDeque<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

fn deviation_pct(current: Option<f64>, baseline: Option<f64>) -> Option<f64> {
    match (current, baseline) {
        (Some(current), Some(baseline)) if baseline > 0.0 => {
            Some(((current - baseline) / baseline) * 100.0)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DailyBiometricSnapshot;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn snapshot(day: u32, hrv: f64, rhr: f64, sleep_min: f64) -> DailyBiometricSnapshot {
        let mut snapshot =
            DailyBiometricSnapshot::empty(NaiveDate::from_ymd_opt(2024, 1, day).unwrap());
        snapshot.cardio.heart_rate_variability = hrv;
        snapshot.cardio.resting_heart_rate = rhr;
        snapshot.sleep.total_minutes = sleep_min;
        if sleep_min > 0.0 {
            snapshot.sleep.efficiency = 0.9;
        }
        snapshot
    }

    #[test]
    fn test_baseline_accumulation() {
        let mut tracker = BaselineTracker::new(7);
        for i in 0..7 {
            tracker.observe(&snapshot(i + 1, 60.0 + f64::from(i), 55.0, 420.0));
        }

        let baselines = tracker.baselines();
        // Average of 60..=66 is 63
        assert_eq!(baselines.hrv_ms, Some(63.0));
        assert_eq!(baselines.resting_hr_bpm, Some(55.0));
        assert_eq!(baselines.sleep_minutes, Some(420.0));
        assert_eq!(baselines.days, 7);
    }

    #[test]
    fn test_window_rolls_off_old_values() {
        let mut tracker = BaselineTracker::new(3);
        for i in 0..5 {
            // 60, 70, 80, 90, 100; only the last three stay in the window
            tracker.observe(&snapshot(i + 1, 60.0 + f64::from(i) * 10.0, 55.0, 420.0));
        }

        let baselines = tracker.baselines();
        assert_eq!(baselines.hrv_ms, Some(90.0));
        assert_eq!(baselines.days, 3);
    }

    #[test]
    fn test_deviation_uses_pre_observation_baseline() {
        let mut tracker = BaselineTracker::new(7);
        for i in 0..7 {
            tracker.observe(&snapshot(i + 1, 60.0, 55.0, 420.0));
        }

        let deviation = tracker.observe(&snapshot(8, 72.0, 55.0, 420.0));
        // 72 against a baseline of exactly 60
        assert_eq!(deviation.hrv_pct, Some(20.0));
        assert_eq!(deviation.resting_hr_pct, Some(0.0));
    }

    #[test]
    fn test_zero_filled_days_do_not_drag_baselines() {
        let mut tracker = BaselineTracker::new(7);
        tracker.observe(&snapshot(1, 60.0, 55.0, 420.0));
        // A data-free day: everything 0
        tracker.observe(&snapshot(2, 0.0, 0.0, 0.0));

        let baselines = tracker.baselines();
        assert_eq!(baselines.hrv_ms, Some(60.0));
        assert_eq!(baselines.days, 1);
    }

    #[test]
    fn test_no_deviation_without_baseline() {
        let mut tracker = BaselineTracker::default();
        let deviation = tracker.observe(&snapshot(1, 65.0, 55.0, 420.0));
        assert_eq!(deviation.hrv_pct, None);
        assert_eq!(deviation.resting_hr_pct, None);
        assert_eq!(deviation.sleep_duration_pct, None);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut tracker = BaselineTracker::new(7);
        tracker.observe(&snapshot(1, 65.0, 55.0, 420.0));

        let json = tracker.to_json().unwrap();
        let loaded = BaselineTracker::from_json(&json).unwrap();

        assert_eq!(
            tracker.baselines().hrv_ms,
            loaded.baselines().hrv_ms
        );
        assert_eq!(tracker.baselines().days, loaded.baselines().days);
    }
}
