//! OpenAI provider: Chat Completions for ordinary models, the Responses API
//! (with a `reasoning` block) for the reasoning model family.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    decode_response, Generate, LlmError, NativeResponse, OutputPart, ProviderRequest, RequestMode,
};
use crate::models::analysis::ProviderKind;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 900;
/// Reasoning tokens count against this cap, so it is well above `MAX_TOKENS`.
const REASONING_MAX_OUTPUT_TOKENS: u32 = 4000;
const REASONING_EFFORT: &str = "low";

const REASONING_MODEL_PREFIXES: [&str; 4] = ["gpt-5", "o1", "o3", "o4"];

/// Whether `model` belongs to the reasoning family that is queried through
/// the Responses API first.
pub fn is_reasoning_model(model: &str) -> bool {
    let model = model.trim().to_ascii_lowercase();
    REASONING_MODEL_PREFIXES
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types: Chat Completions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<ChatContent>,
    #[serde(default)]
    refusal: Option<String>,
}

/// `message.content` is usually a string but some compatible servers send parts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatContentPart {
    Text { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types: Responses API
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    reasoning: ReasoningConfig,
    max_output_tokens: u32,
    text: TextConfig,
}

#[derive(Debug, Serialize)]
struct ReasoningConfig {
    effort: &'static str,
}

#[derive(Debug, Serialize)]
struct TextConfig {
    format: TextFormat,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TextFormat {
    JsonObject,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ResponsesOutputItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponsesOutputItem {
    Message {
        #[serde(default)]
        content: Vec<ResponsesContent>,
    },
    // reasoning summaries, tool calls
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponsesContent {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

// ────────────────────────────────────────────────────────────────────────────
// Adapters into NativeResponse
// ────────────────────────────────────────────────────────────────────────────

impl From<ChatCompletionResponse> for NativeResponse {
    fn from(response: ChatCompletionResponse) -> Self {
        let output = response
            .choices
            .into_iter()
            .take(1)
            .map(|choice| {
                let message = choice.message;
                let mut item = match message.content {
                    Some(ChatContent::Text(text)) => OutputPart::text(text),
                    Some(ChatContent::Parts(parts)) => OutputPart::with_content(
                        parts.into_iter().filter_map(chat_part_to_output).collect(),
                    ),
                    None => OutputPart::default(),
                };
                item.refusal = message.refusal;
                item
            })
            .collect();

        NativeResponse {
            output_text: None,
            output,
        }
    }
}

fn chat_part_to_output(part: ChatContentPart) -> Option<OutputPart> {
    match part {
        ChatContentPart::Text { text } => Some(OutputPart::text(text)),
        ChatContentPart::Refusal { refusal } => Some(OutputPart::refusal(refusal)),
        ChatContentPart::Other => None,
    }
}

impl From<ResponsesResponse> for NativeResponse {
    fn from(response: ResponsesResponse) -> Self {
        let output = response
            .output
            .into_iter()
            .filter_map(|item| match item {
                ResponsesOutputItem::Message { content } => Some(OutputPart::with_content(
                    content
                        .into_iter()
                        .filter_map(|part| match part {
                            ResponsesContent::OutputText { text } => Some(OutputPart::text(text)),
                            ResponsesContent::Refusal { refusal } => {
                                Some(OutputPart::refusal(refusal))
                            }
                            ResponsesContent::Other => None,
                        })
                        .collect(),
                )),
                ResponsesOutputItem::Other => None,
            })
            .collect();

        NativeResponse {
            output_text: response.output_text,
            output,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: String, base_url: &str, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    async fn chat_completion(
        &self,
        request: &ProviderRequest<'_>,
    ) -> Result<NativeResponse, LlmError> {
        let reasoning_family = is_reasoning_model(request.model);
        let body = ChatCompletionRequest {
            model: request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            // The reasoning family rejects both `temperature` and `max_tokens`.
            temperature: (!reasoning_family).then_some(TEMPERATURE),
            max_tokens: (!reasoning_family).then_some(MAX_TOKENS),
            max_completion_tokens: reasoning_family.then_some(REASONING_MAX_OUTPUT_TOKENS),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let completion: ChatCompletionResponse = decode_response(response).await?;
        debug!("OpenAI chat completion returned {} choices", completion.choices.len());
        Ok(completion.into())
    }

    async fn reasoning_response(
        &self,
        request: &ProviderRequest<'_>,
    ) -> Result<NativeResponse, LlmError> {
        let body = ResponsesRequest {
            model: request.model,
            instructions: request.system,
            input: request.prompt,
            reasoning: ReasoningConfig {
                effort: REASONING_EFFORT,
            },
            max_output_tokens: REASONING_MAX_OUTPUT_TOKENS,
            text: TextConfig {
                format: TextFormat::JsonObject,
            },
        };

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let reply: ResponsesResponse = decode_response(response).await?;
        debug!("OpenAI responses call returned {} output items", reply.output.len());
        Ok(reply.into())
    }
}

#[async_trait]
impl Generate for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ProviderRequest<'_>) -> Result<NativeResponse, LlmError> {
        match request.mode {
            RequestMode::Chat => self.chat_completion(request).await,
            RequestMode::Reasoning => self.reasoning_response(request).await,
        }
    }
}
