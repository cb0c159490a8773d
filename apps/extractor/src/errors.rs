use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::extraction::ExtractionError;
use crate::fetcher::RetrievalError;
use crate::store::PersistenceError;

/// Everything that can end a pipeline run early.
///
/// Each variant's message is what callers see in the failure envelope's
/// `error` field, so it carries the underlying cause.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Bad event: {0}")]
    BadEvent(String),

    #[error("Failed to retrieve document: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Failed to extract CV data: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Failed to store CV data: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Processing timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl PipelineError {
    /// Short machine-readable tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::BadEvent(_) => "BAD_EVENT",
            PipelineError::Retrieval(_) => "RETRIEVAL_ERROR",
            PipelineError::Extraction(_) => "EXTRACTION_ERROR",
            PipelineError::Persistence(_) => "PERSISTENCE_ERROR",
            PipelineError::Configuration(_) => "CONFIGURATION_ERROR",
            PipelineError::Timeout(_) => "TIMEOUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_cause() {
        let err = PipelineError::from(ExtractionError::MissingToolUse);
        assert_eq!(
            err.to_string(),
            "Failed to extract CV data: could not find tool use content in model response"
        );
        assert_eq!(err.kind(), "EXTRACTION_ERROR");
    }

    #[test]
    fn test_timeout_message() {
        let err = PipelineError::Timeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "Processing timed out after 300s");
    }

    #[test]
    fn test_config_error_converts() {
        let err: PipelineError = ConfigError::Missing("TABLE_NAME").into();
        assert_eq!(err.kind(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("TABLE_NAME"));
    }
}
