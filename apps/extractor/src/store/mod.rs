//! Result Store: append-only persistence of `StoredAnalysis` envelopes.
//!
//! Backends are write-only from this service's point of view. Nothing here
//! reads, updates or deletes a stored analysis.

pub mod dynamo;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::models::analysis::StoredAnalysis;
use crate::models::candidate::CandidateRecord;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write to '{table}' failed: {message}")]
    Write { table: String, message: String },
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Destination table, for logs.
    fn table(&self) -> &str;

    async fn put(&self, analysis: &StoredAnalysis) -> Result<(), PersistenceError>;
}

/// Wraps `record` in a fresh `StoredAnalysis` and writes it.
pub async fn store_analysis(
    store: &dyn ResultStore,
    file_name: &str,
    record: &CandidateRecord,
) -> Result<StoredAnalysis, PersistenceError> {
    let analysis = StoredAnalysis::new(file_name, record)?;
    store.put(&analysis).await?;
    info!(
        "Stored analysis {} for '{}' in {}",
        analysis.id,
        file_name,
        store.table()
    );
    Ok(analysis)
}

/// Table names are interpolated into SQL, so only plain (optionally
/// schema-qualified) identifiers are accepted.
pub(crate) fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').count() <= 2
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                && part.len() <= 63
        })
}
