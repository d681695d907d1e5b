use regionstats_common::TelemetryRecord;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to bring the telemetry dataset into memory. Always fatal at startup.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read telemetry source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse telemetry source {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid telemetry record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Immutable, process-lifetime collection of telemetry records.
#[derive(Debug, Clone, Default)]
pub struct TelemetryStore {
    records: Vec<TelemetryRecord>,
}

impl TelemetryStore {
    /// Build a store from already-decoded records, rejecting any that are unusable.
    pub fn from_records(records: Vec<TelemetryRecord>) -> Result<Self, StoreError> {
        for (index, record) in records.iter().enumerate() {
            validate_record(record).map_err(|reason| StoreError::InvalidRecord { index, reason })?;
        }
        Ok(Self { records })
    }

    /// Decode a JSON array of records.
    pub fn from_json(path: &Path, json: &str) -> Result<Self, StoreError> {
        let records: Vec<TelemetryRecord> = serde_json::from_str(json)
            .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })?;
        Self::from_records(records)
    }

    /// Read and decode the dataset at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(path, &json)
    }

    /// All records whose region equals `region` exactly. Empty when none match.
    pub fn records_for_region(&self, region: &str) -> Vec<&TelemetryRecord> {
        self.records.iter().filter(|r| r.region == region).collect()
    }

    /// Distinct region identifiers in first-seen order.
    pub fn regions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.region.as_str())
            .filter(|region| seen.insert(*region))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn validate_record(record: &TelemetryRecord) -> Result<(), String> {
    if record.region.is_empty() {
        return Err("region must not be empty".to_string());
    }
    if !record.latency_ms.is_finite() || record.latency_ms < 0.0 {
        return Err(format!("latency_ms must be a non-negative number, got {}", record.latency_ms));
    }
    if !record.uptime_pct.is_finite() {
        return Err(format!("uptime_pct must be a finite number, got {}", record.uptime_pct));
    }
    Ok(())
}
