//! Extraction Invoker: sends a CV to a hosted model with the candidate schema
//! bound as a tool, and decodes the tool call back into a `CandidateRecord`.
//!
//! The model backend is pluggable (`ExtractionModel`), chosen once at startup.
//! Default: `BedrockModel` (Converse API). Alternative: `AnthropicModel`.

pub mod anthropic;
pub mod bedrock;
pub mod prompt;
pub mod schema;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::prompt::CV_EXTRACTION_PROMPT;
use crate::extraction::schema::ToolDefinition;
use crate::extraction::validation::{validate_record, SchemaViolation};
use crate::models::candidate::CandidateRecord;

/// Attachment name the document is sent under.
pub const DOCUMENT_NAME: &str = "cv";

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("could not build request: {0}")]
    InvalidRequest(String),

    #[error("could not read response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("model response did not contain expected content blocks (stop reason: {0})")]
    EmptyResponse(String),

    #[error("could not find tool use content in model response")]
    MissingToolUse,

    #[error("model called unexpected tool '{0}'")]
    UnexpectedTool(String),

    #[error("tool input does not match the candidate schema: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("extracted record failed validation: {}", join_violations(.0))]
    Invalid(Vec<SchemaViolation>),
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Everything a backend needs for one extraction call.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    /// Raw PDF bytes.
    pub document: &'a [u8],
    pub document_name: &'a str,
    pub prompt: &'a str,
    /// The tool the model is forced to call.
    pub tool: &'a ToolDefinition,
}

/// What the model sent back, collapsed to the part the invoker cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Free-form prose; no tool was called.
    Text(String),
    /// The model called a tool. Backends report the first tool-use block.
    ToolCall { name: String, input: Value },
    /// No content blocks at all.
    Empty { stop_reason: String },
}

/// A hosted model that can answer a single-document, single-tool request.
///
/// Carried in the pipeline as `Arc<dyn ExtractionModel>`.
#[async_trait]
pub trait ExtractionModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn invoke(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError>;
}

/// Turns document bytes into a validated `CandidateRecord`. One model call per
/// document, no retries.
#[derive(Clone)]
pub struct Extractor {
    model: Arc<dyn ExtractionModel>,
    tool: ToolDefinition,
}

impl Extractor {
    pub fn new(model: Arc<dyn ExtractionModel>) -> Self {
        Self {
            model,
            tool: ToolDefinition::candidate(),
        }
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    pub async fn extract(&self, document: &[u8]) -> Result<CandidateRecord, ExtractionError> {
        let request = ModelRequest {
            document,
            document_name: DOCUMENT_NAME,
            prompt: CV_EXTRACTION_PROMPT,
            tool: &self.tool,
        };

        debug!(
            "Invoking {} with {} byte document",
            self.model.model_id(),
            document.len()
        );
        let reply = self.model.invoke(request).await?;
        let record = decode_reply(reply, self.tool.name)?;

        let validation = validate_record(&record);
        for warning in &validation.warnings {
            warn!("Extraction warning: {warning}");
        }
        if !validation.passed() {
            return Err(ExtractionError::Invalid(validation.violations));
        }

        Ok(record)
    }
}

/// Requires a tool call to `tool_name` and decodes its input.
pub fn decode_reply(reply: ModelReply, tool_name: &str) -> Result<CandidateRecord, ExtractionError> {
    match reply {
        ModelReply::ToolCall { name, input } if name == tool_name => {
            Ok(serde_json::from_value(input)?)
        }
        ModelReply::ToolCall { name, .. } => Err(ExtractionError::UnexpectedTool(name)),
        ModelReply::Text(text) => {
            let preview: String = text.chars().take(200).collect();
            warn!("Model answered in prose instead of calling the tool: {preview}");
            Err(ExtractionError::MissingToolUse)
        }
        ModelReply::Empty { stop_reason } => Err(ExtractionError::EmptyResponse(stop_reason)),
    }
}
