use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ConverseOutput, DocumentBlock, DocumentFormat, DocumentSource,
    Message, SpecificToolChoice, Tool, ToolChoice, ToolConfiguration, ToolInputSchema,
    ToolSpecification,
};
use aws_sdk_bedrockruntime::Client;
use aws_smithy_types::{Document, Number};
use serde_json::Value;
use tracing::debug;

use crate::extraction::{ExtractionModel, ModelError, ModelReply, ModelRequest};

/// Default Bedrock foundation model.
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Bedrock Runtime backend using the Converse API with a forced tool choice.
#[derive(Clone)]
pub struct BedrockModel {
    client: Client,
    model_id: String,
}

impl BedrockModel {
    pub fn new(client: Client, model_id: String) -> Self {
        Self { client, model_id }
    }
}

#[async_trait]
impl ExtractionModel for BedrockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn invoke(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError> {
        let message = build_message(&request)?;
        let tool_config = build_tool_config(&request)?;

        let output = self
            .client
            .converse()
            .model_id(&self.model_id)
            .messages(message)
            .tool_config(tool_config)
            .send()
            .await
            .map_err(|e| ModelError::Request(DisplayErrorContext(&e).to_string()))?;

        if let Some(usage) = output.usage() {
            debug!(
                "Bedrock call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens(),
                usage.output_tokens()
            );
        }

        let content = match output.output() {
            Some(ConverseOutput::Message(message)) => message.content(),
            _ => &[],
        };
        Ok(reply_from_blocks(content, output.stop_reason().as_str()))
    }
}

fn build_message(request: &ModelRequest<'_>) -> Result<Message, ModelError> {
    let document = DocumentBlock::builder()
        .name(request.document_name)
        .format(DocumentFormat::Pdf)
        .source(DocumentSource::Bytes(Blob::new(request.document.to_vec())))
        .build()
        .map_err(|e| ModelError::InvalidRequest(e.to_string()))?;

    Message::builder()
        .role(ConversationRole::User)
        .content(ContentBlock::Document(document))
        .content(ContentBlock::Text(request.prompt.to_string()))
        .build()
        .map_err(|e| ModelError::InvalidRequest(e.to_string()))
}

fn build_tool_config(request: &ModelRequest<'_>) -> Result<ToolConfiguration, ModelError> {
    let spec = ToolSpecification::builder()
        .name(request.tool.name)
        .description(request.tool.description)
        .input_schema(ToolInputSchema::Json(json_to_document(
            &request.tool.input_schema,
        )))
        .build()
        .map_err(|e| ModelError::InvalidRequest(e.to_string()))?;

    let choice = SpecificToolChoice::builder()
        .name(request.tool.name)
        .build()
        .map_err(|e| ModelError::InvalidRequest(e.to_string()))?;

    ToolConfiguration::builder()
        .tools(Tool::ToolSpec(spec))
        .tool_choice(ToolChoice::Tool(choice))
        .build()
        .map_err(|e| ModelError::InvalidRequest(e.to_string()))
}

/// First tool-use block wins; otherwise any text; otherwise empty.
fn reply_from_blocks(content: &[ContentBlock], stop_reason: &str) -> ModelReply {
    let tool_use = content.iter().find_map(|block| match block {
        ContentBlock::ToolUse(tool_use) => Some(tool_use),
        _ => None,
    });
    if let Some(tool_use) = tool_use {
        return ModelReply::ToolCall {
            name: tool_use.name().to_string(),
            input: document_to_json(tool_use.input()),
        };
    }

    let text: Vec<&str> = content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    if !text.is_empty() {
        return ModelReply::Text(text.join("\n"));
    }

    ModelReply::Empty {
        stop_reason: stop_reason.to_string(),
    }
}

fn json_to_document(value: &Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(Number::NegInt(i))
            } else {
                Document::Number(Number::Float(n.as_f64().unwrap_or_default()))
            }
        }
        Value::String(s) => Document::String(s.clone()),
        Value::Array(items) => Document::Array(items.iter().map(json_to_document).collect()),
        Value::Object(map) => Document::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_document(v)))
                .collect(),
        ),
    }
}

fn document_to_json(document: &Document) -> Value {
    match document {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Number(Number::PosInt(u)) => Value::from(*u),
        Document::Number(Number::NegInt(i)) => Value::from(*i),
        // NaN and infinities have no JSON form
        Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Document::String(s) => Value::String(s.clone()),
        Document::Array(items) => Value::Array(items.iter().map(document_to_json).collect()),
        Document::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_to_json(v)))
                .collect(),
        ),
    }
}
