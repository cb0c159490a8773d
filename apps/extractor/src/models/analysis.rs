use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::candidate::CandidateRecord;

/// A persisted extraction result plus its provenance.
/// Written once per successful run; never updated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub file_name: String,
    /// The `CandidateRecord` as JSON text.
    pub analysis_result: String,
    pub timestamp: DateTime<Utc>,
}

impl StoredAnalysis {
    /// Wraps a record with a fresh id and the current time.
    pub fn new(file_name: &str, record: &CandidateRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            analysis_result: serde_json::to_string(record)?,
            timestamp: Utc::now(),
        })
    }

    /// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
