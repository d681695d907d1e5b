use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned when a query lacks `regions` or `threshold_ms`.
pub const REQUIRED_FIELDS_MESSAGE: &str = "regions and threshold_ms are required";

/// Error types for RegionStats requests
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionStatsError {
    #[error("{}", REQUIRED_FIELDS_MESSAGE)]
    MissingFields,

    #[error("invalid request body: {0}")]
    MalformedBody(String),
}

/// One telemetry observation as stored in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub region: String,
    pub latency_ms: f64,
    pub uptime_pct: f64,
}

/// Body of `POST /`.
///
/// Both fields are optional at the wire level so that an absent or `null`
/// value reaches validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsQuery {
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub threshold_ms: Option<f64>,
}

impl MetricsQuery {
    pub fn new(regions: Vec<String>, threshold_ms: f64) -> Self {
        Self { regions: Some(regions), threshold_ms: Some(threshold_ms) }
    }
}

/// Aggregate statistics for one queried region.
///
/// The optional fields are `None` when no record matched the region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMetrics {
    pub region: String,
    pub avg_latency: Option<f64>,
    pub p95_latency: Option<f64>,
    pub avg_uptime: Option<f64>,
    pub breaches: u64,
}

impl RegionMetrics {
    /// Result for a region with no matching records.
    pub fn empty(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            avg_latency: None,
            p95_latency: None,
            avg_uptime: None,
            breaches: 0,
        }
    }
}

/// Success envelope for `POST /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: Vec<RegionMetrics>,
}

/// JSON error envelope returned by the server for all error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result type for RegionStats operations
pub type Result<T> = std::result::Result<T, RegionStatsError>;
