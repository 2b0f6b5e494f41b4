//! LLM client: the single point of entry for all provider calls.
//!
//! ARCHITECTURAL RULE: No other module may call a provider API directly.
//! Providers implement [`Generate`] and convert their wire responses into the
//! provider-neutral [`NativeResponse`] before anything else looks at them.
//!
//! Clients here never retry. The only second request the service makes is the
//! empty-body fallback owned by the dispatcher.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::warn;

use crate::models::analysis::ProviderKind;

pub mod gemini;
pub mod openai;

#[cfg(test)]
pub mod fake;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// How the outbound request is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Conventional chat-style completion.
    Chat,
    /// Structured reasoning request (OpenAI Responses API with a `reasoning` block).
    Reasoning,
}

/// Everything a provider needs to make one call.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub model: &'a str,
    pub mode: RequestMode,
}

/// Provider-neutral view of a completion response.
///
/// `output_text` is the aggregate field some APIs expose; `output` is the
/// item/part tree the text may also (or only) live in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeResponse {
    pub output_text: Option<String>,
    pub output: Vec<OutputPart>,
}

/// One node of a response's output tree. Items and content parts share a shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPart {
    pub text: Option<String>,
    pub refusal: Option<String>,
    pub content: Vec<OutputPart>,
}

impl OutputPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn refusal(refusal: impl Into<String>) -> Self {
        Self {
            refusal: Some(refusal.into()),
            ..Default::default()
        }
    }

    pub fn with_content(content: Vec<OutputPart>) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }
}

/// The uniform generate capability every provider exposes.
///
/// Carried by the dispatcher as `Arc<dyn Generate>`.
#[async_trait]
pub trait Generate: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Default model configured for this provider.
    fn model(&self) -> &str;

    async fn generate(&self, request: &ProviderRequest<'_>) -> Result<NativeResponse, LlmError>;
}

/// Builds the HTTP client shared by all providers. The timeout applies to the
/// whole request; hitting it surfaces as `LlmError::Http`.
pub fn build_http_client(timeout: Duration) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Decodes a successful JSON body, or turns a non-2xx response into `LlmError::Api`.
/// OpenAI and Gemini both wrap failures as `{"error": {"message": ...}}`.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, LlmError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("LLM API returned {}: {}", status, body);
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}
