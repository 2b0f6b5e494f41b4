//! Gemini provider via `models/{model}:generateContent`.
//!
//! Gemini has a single request shape, so `RequestMode` is ignored here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{decode_response, Generate, LlmError, NativeResponse, OutputPart, ProviderRequest};
use crate::models::analysis::ProviderKind;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TEMPERATURE: f32 = 0.5;
const MAX_OUTPUT_TOKENS: u32 = 900;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: RequestContent<'a>,
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

/// Parts carry text, thought summaries, or function calls; only text matters here.
#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl From<GenerateContentResponse> for NativeResponse {
    fn from(response: GenerateContentResponse) -> Self {
        let mut output: Vec<OutputPart> = response
            .candidates
            .into_iter()
            .take(1)
            .filter_map(|candidate| candidate.content)
            .map(|content| {
                OutputPart::with_content(
                    content
                        .parts
                        .into_iter()
                        .filter(|part| !part.thought)
                        .filter_map(|part| part.text.map(OutputPart::text))
                        .collect(),
                )
            })
            .collect();

        // A blocked prompt comes back with no candidates; surface the reason as a refusal.
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            output.push(OutputPart::refusal(format!(
                "Gemini blocked the request: {reason}"
            )));
        }

        NativeResponse {
            output_text: None,
            output,
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: String, base_url: &str, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[async_trait]
impl Generate for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ProviderRequest<'_>) -> Result<NativeResponse, LlmError> {
        let body = GenerateContentRequest {
            system_instruction: RequestContent {
                role: None,
                parts: [RequestPart {
                    text: request.system,
                }],
            },
            contents: [RequestContent {
                role: Some("user"),
                parts: [RequestPart {
                    text: request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, request.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let reply: GenerateContentResponse = decode_response(response).await?;
        debug!("Gemini returned {} candidates", reply.candidates.len());
        Ok(reply.into())
    }
}
