//! Provider dispatcher: picks the configured provider, sends the analysis
//! prompt, and runs the recovery pipeline over whatever comes back.
//!
//! Flow: build_prompt → provider.generate → extract_response_text →
//!       recover_analysis → format_feedback.
//!
//! Reasoning-family OpenAI models get at most one extra request: when the
//! Responses API call yields no text, one Chat Completions call follows.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::feedback::format_feedback;
use crate::analysis::json_recovery::recover_analysis;
use crate::analysis::prompts::{build_prompt, ANALYSIS_SYSTEM};
use crate::analysis::text_extract::extract_response_text;
use crate::config::AiConfig;
use crate::llm_client::gemini::GeminiClient;
use crate::llm_client::openai::{is_reasoning_model, OpenAiClient};
use crate::llm_client::{build_http_client, Generate, LlmError, ProviderRequest, RequestMode};
use crate::models::analysis::{
    AnalysisRecord, GenerationRequest, ProviderKind, RawGenerationResult,
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("AI provider not configured. Set OPENAI_API_KEY or GEMINI_API_KEY.")]
    ProviderUnavailable,

    #[error("Upstream provider call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("{provider} model {model} returned an empty response")]
    EmptyUpstreamResponse { provider: ProviderKind, model: String },
}

/// Result handed back to callers of [`ProviderDispatcher::generate_analysis`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub provider: ProviderKind,
    pub model: String,
    pub raw_text: String,
    pub analysis: Option<AnalysisRecord>,
    /// Rendered analysis, or the raw text when no analysis could be recovered.
    pub feedback: String,
}

/// Which request modes one dispatch may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttemptPlan {
    primary: RequestMode,
    fallback: Option<RequestMode>,
}

impl AttemptPlan {
    fn for_provider(kind: ProviderKind, model: &str) -> Self {
        match kind {
            ProviderKind::OpenAi if is_reasoning_model(model) => Self {
                primary: RequestMode::Reasoning,
                fallback: Some(RequestMode::Chat),
            },
            _ => Self {
                primary: RequestMode::Chat,
                fallback: None,
            },
        }
    }
}

/// `FallbackAttempted` can only move to `Done`, which bounds a dispatch to two calls.
enum DispatchState {
    Pending,
    PrimaryAttempted(String),
    FallbackAttempted(String),
    Done(String),
}

/// Holds the one active provider, if any. Stateless between calls.
#[derive(Clone)]
pub struct ProviderDispatcher {
    provider: Option<Arc<dyn Generate>>,
}

impl ProviderDispatcher {
    pub fn new(provider: Option<Arc<dyn Generate>>) -> Self {
        Self { provider }
    }

    /// Builds the provider selected by `config`. No configured provider is not
    /// an error here; requests fail with `ProviderUnavailable` instead.
    pub fn from_config(config: &AiConfig) -> Result<Self, LlmError> {
        let Some(kind) = config.active_provider() else {
            return Ok(Self::new(None));
        };

        let http = build_http_client(config.timeout)?;
        let provider: Arc<dyn Generate> = match kind {
            ProviderKind::OpenAi => Arc::new(OpenAiClient::new(
                http,
                config.openai_api_key.clone().unwrap_or_default(),
                &config.openai_base_url,
                config.openai_model.clone(),
            )),
            ProviderKind::Gemini => Arc::new(GeminiClient::new(
                http,
                config.gemini_api_key.clone().unwrap_or_default(),
                &config.gemini_base_url,
                config.gemini_model.clone(),
            )),
        };

        Ok(Self::new(Some(provider)))
    }

    /// The active provider and its model, for startup logging and diagnostics.
    pub fn active(&self) -> Option<(ProviderKind, &str)> {
        self.provider.as_deref().map(|p| (p.kind(), p.model()))
    }

    /// Sends the analysis prompt and returns the provider's raw text.
    pub async fn dispatch(
        &self,
        request: &GenerationRequest,
    ) -> Result<RawGenerationResult, AnalysisError> {
        let provider = self
            .provider
            .as_deref()
            .ok_or(AnalysisError::ProviderUnavailable)?;
        let kind = provider.kind();
        let model = provider.model();
        let plan = AttemptPlan::for_provider(kind, model);
        let prompt = build_prompt(request);

        let mut state = DispatchState::Pending;
        let raw_text = loop {
            state = match state {
                DispatchState::Pending => DispatchState::PrimaryAttempted(
                    attempt(provider, &prompt, plan.primary).await?,
                ),
                DispatchState::PrimaryAttempted(text) => match plan.fallback {
                    Some(mode) if text.is_empty() => {
                        info!(
                            "{} {} returned an empty {:?} response, falling back to {:?}",
                            kind, model, plan.primary, mode
                        );
                        DispatchState::FallbackAttempted(attempt(provider, &prompt, mode).await?)
                    }
                    _ => DispatchState::Done(text),
                },
                DispatchState::FallbackAttempted(text) => DispatchState::Done(text),
                DispatchState::Done(text) => break text,
            };
        };

        if raw_text.is_empty() {
            warn!("{} {} produced no usable text", kind, model);
            return Err(AnalysisError::EmptyUpstreamResponse {
                provider: kind,
                model: model.to_string(),
            });
        }

        Ok(RawGenerationResult {
            raw_text,
            model: model.to_string(),
            provider: kind,
        })
    }

    /// Full pipeline for one resume. Extraction never fails: an unrecoverable
    /// response yields `analysis: None` with the raw text as `feedback`.
    pub async fn generate_analysis(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let request = GenerationRequest::new(resume_text, job_description);
        let raw = self.dispatch(&request).await?;

        let analysis = match recover_analysis(&raw.raw_text, request.has_job_description()) {
            Some((record, strategy)) => {
                debug!("Analysis recovered via {:?}", strategy);
                Some(record)
            }
            None => {
                warn!(
                    "Could not recover an analysis from {} chars of {} output",
                    raw.raw_text.chars().count(),
                    raw.provider
                );
                None
            }
        };

        let feedback = match &analysis {
            Some(record) => format_feedback(Some(record)),
            None => raw.raw_text.clone(),
        };

        Ok(AnalysisOutcome {
            provider: raw.provider,
            model: raw.model,
            raw_text: raw.raw_text,
            analysis,
            feedback,
        })
    }
}

async fn attempt(
    provider: &dyn Generate,
    prompt: &str,
    mode: RequestMode,
) -> Result<String, AnalysisError> {
    let request = ProviderRequest {
        system: ANALYSIS_SYSTEM,
        prompt,
        model: provider.model(),
        mode,
    };
    let response = provider.generate(&request).await?;
    Ok(extract_response_text(&response))
}
