//! Error types for Vitalgrid

use crate::types::AuthorizationState;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the aggregation engine
#[derive(Debug, Error)]
pub enum BiometricError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Health data access not granted (state: {state})")]
    AuthorizationDenied { state: AuthorizationState },

    #[error("Health data capability is not available on this host")]
    NotAvailable,

    #[error("Data source query failed for {what}: {message}")]
    DataSourceQuery { what: String, message: String },

    #[error("Data source query for {what} timed out")]
    QueryTimeout { what: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl BiometricError {
    /// Wrap an underlying source failure for a named metric or sample type
    pub fn query(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::DataSourceQuery {
            what: what.into(),
            message: message.to_string(),
        }
    }
}
