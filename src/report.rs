//! Payload encoding
//!
//! Wraps an assembled snapshot sequence into a self-describing JSON payload
//! for downstream consumers: producer metadata, the requested range, the
//! per-day records, and optional baseline and cache-effectiveness blocks.

use crate::baseline::Baselines;
use crate::cache::CacheStats;
use crate::error::BiometricError;
use crate::types::DailyBiometricSnapshot;
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current payload schema version
pub const PAYLOAD_VERSION: &str = "1.0.0";

/// Producer metadata embedded in every payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// The requested aggregation window
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PayloadRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Complete snapshot payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub payload_version: String,
    pub producer: PayloadProducer,
    pub computed_at_utc: String,
    pub range: PayloadRange,
    pub days: Vec<DailyBiometricSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baselines: Option<Baselines>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

/// Encoder for producing snapshot payloads
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Wrap a snapshot sequence into a payload
    pub fn encode(
        &self,
        range: PayloadRange,
        days: Vec<DailyBiometricSnapshot>,
        baselines: Option<Baselines>,
        cache: Option<CacheStats>,
    ) -> SnapshotPayload {
        SnapshotPayload {
            payload_version: PAYLOAD_VERSION.to_string(),
            producer: PayloadProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            range,
            days,
            baselines,
            cache,
        }
    }

    /// Encode straight to pretty-printed JSON
    pub fn encode_to_json(
        &self,
        range: PayloadRange,
        days: Vec<DailyBiometricSnapshot>,
        baselines: Option<Baselines>,
        cache: Option<CacheStats>,
    ) -> Result<String, BiometricError> {
        let payload = self.encode(range, days, baselines, cache);
        serde_json::to_string_pretty(&payload).map_err(BiometricError::Json)
    }
}
