//! Vitalgrid - Daily biometric aggregation and caching engine
//!
//! Vitalgrid turns a health data source's heterogeneous outputs into one
//! gap-free sequence of per-day biometric snapshots: quantity metrics are
//! fetched concurrently through an aggregation cache, raw sleep-stage
//! intervals are reduced to per-day sleep records, and both are joined over
//! every calendar day of the requested range with zero-filled defaults.
//!
//! ## Modules
//!
//! - **Service**: range validation, authorization gating, concurrent fetch,
//!   and the gap-free daily join
//! - **Collector / Cache**: cache-first per-metric aggregation
//! - **Sleep**: stage-interval reduction
//! - **Baseline**: rolling baselines over emitted snapshots
//! - **Source**: the data-source capability trait and a JSON fixture source

pub mod baseline;
pub mod cache;
pub mod collector;
pub mod error;
pub mod report;
pub mod service;
pub mod sleep;
pub mod source;
pub mod types;

pub use baseline::{BaselineTracker, Baselines, DEFAULT_BASELINE_WINDOW};
pub use cache::{AggregationCache, CacheStats, DayValueMap};
pub use collector::MetricCollector;
pub use error::BiometricError;
pub use report::{PayloadRange, SnapshotEncoder, SnapshotPayload};
pub use service::{BiometricService, ServiceConfig};
pub use sleep::SleepSessionReducer;
pub use source::{BiometricSource, FixtureSource};
pub use types::{
    AuthorizationState, DailyBiometricSnapshot, MetricKind, SleepSessionRecord, SleepStage,
    SleepStageSample, WorkoutRecord,
};

/// Engine version embedded in all payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for payloads
pub const PRODUCER_NAME: &str = "vitalgrid";
