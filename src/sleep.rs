//! Sleep session reduction
//!
//! Reduces raw stage-tagged sleep intervals into one record per calendar
//! day. Samples are grouped by the calendar day of their start timestamp;
//! an interval crossing midnight belongs entirely to its start day.

use crate::types::{SleepSessionRecord, SleepStage, SleepStageSample};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Reducer for converting stage intervals into per-day sleep records
pub struct SleepSessionReducer;

impl SleepSessionReducer {
    /// Reduce samples into per-day records. Days with no samples are absent
    /// from the returned map; the joiner substitutes defaults.
    pub fn reduce(samples: &[SleepStageSample]) -> HashMap<NaiveDate, SleepSessionRecord> {
        let mut days: HashMap<NaiveDate, SleepSessionRecord> = HashMap::new();

        for sample in samples {
            let day = sample.start.date_naive();
            let minutes = sample.duration_minutes();
            let record = days.entry(day).or_default();

            record.bedtime = Some(match record.bedtime {
                Some(bedtime) => bedtime.min(sample.start),
                None => sample.start,
            });
            record.wake_time = Some(match record.wake_time {
                Some(wake_time) => wake_time.max(sample.end),
                None => sample.end,
            });

            record.total_minutes += minutes;
            match sample.stage {
                SleepStage::Rem => record.rem_minutes += minutes,
                SleepStage::Core => record.core_minutes += minutes,
                SleepStage::Deep => record.deep_minutes += minutes,
                SleepStage::Awake => record.awake_minutes += minutes,
            }
        }

        for record in days.values_mut() {
            record.efficiency = if record.total_minutes > 0.0 {
                (1.0 - record.awake_minutes / record.total_minutes).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        days
    }
}
