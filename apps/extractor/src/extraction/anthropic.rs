//! Anthropic Messages API backend.
//!
//! Sends the CV as a base64 PDF document block and forces the model to call the
//! extraction tool. Single attempt per call: redelivery is the caller's job.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::extraction::{ExtractionModel, ModelError, ModelReply, ModelRequest};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL_ID: &str = "claude-3-5-sonnet-20241022";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    tools: Vec<ToolParam<'a>>,
    tool_choice: ToolChoiceParam<'a>,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Debug, Serialize)]
struct ToolParam<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolChoiceParam<'a> {
    Tool { name: &'a str },
}

#[derive(Debug, Serialize)]
struct MessageParam<'a> {
    role: &'a str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Document {
        title: &'a str,
        source: Base64Source,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct Base64Source {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct AnthropicModel {
    client: Client,
    api_key: String,
    model_id: String,
}

impl AnthropicModel {
    pub fn new(api_key: String, model_id: String) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ModelError::InvalidRequest(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model_id,
        })
    }
}

#[async_trait]
impl ExtractionModel for AnthropicModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn invoke(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError> {
        let body = build_request(&self.model_id, &request);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Anthropic API returned {}: {}", status, body);
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Anthropic call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(reply_from_response(parsed))
    }
}

fn build_request<'a>(model_id: &'a str, request: &ModelRequest<'a>) -> MessagesRequest<'a> {
    MessagesRequest {
        model: model_id,
        max_tokens: MAX_TOKENS,
        tools: vec![ToolParam {
            name: request.tool.name,
            description: request.tool.description,
            input_schema: &request.tool.input_schema,
        }],
        tool_choice: ToolChoiceParam::Tool {
            name: request.tool.name,
        },
        messages: vec![MessageParam {
            role: "user",
            content: vec![
                RequestBlock::Document {
                    title: request.document_name,
                    source: Base64Source {
                        source_type: "base64",
                        media_type: "application/pdf",
                        data: STANDARD.encode(request.document),
                    },
                },
                RequestBlock::Text {
                    text: request.prompt,
                },
            ],
        }],
    }
}

fn reply_from_response(response: MessagesResponse) -> ModelReply {
    let mut text = Vec::new();
    for block in response.content {
        match block {
            ResponseBlock::ToolUse { name, input } => return ModelReply::ToolCall { name, input },
            ResponseBlock::Text { text: t } => text.push(t),
            ResponseBlock::Other => {}
        }
    }
    if text.is_empty() {
        ModelReply::Empty {
            stop_reason: response.stop_reason.unwrap_or_else(|| "unknown".to_string()),
        }
    } else {
        ModelReply::Text(text.join("\n"))
    }
}
