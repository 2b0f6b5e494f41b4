use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::dispatcher::AnalysisOutcome;
use crate::errors::AppError;
use crate::models::analysis::{AnalysisRecord, ProviderKind};
use crate::state::AppState;

/// Pasted text shorter than this (after trimming) is rejected before any provider call.
pub const MIN_RESUME_CHARS: usize = 50;

/// Accepts both `jobDescription` and `job_description`. A non-empty
/// `jobDescription` wins even when it is only whitespace.
#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "jobDescription")]
    pub job_description_camel: Option<String>,
    #[serde(default, rename = "job_description")]
    pub job_description_snake: Option<String>,
}

impl AnalyzeTextRequest {
    fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    fn job_description(&self) -> &str {
        self.job_description_camel
            .as_deref()
            .filter(|jd| !jd.is_empty())
            .or(self.job_description_snake.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub feedback: String,
    /// Same value as `overall_score`; older clients read this key.
    pub score: Option<u8>,
    pub overall_score: Option<u8>,
    pub ats_score: Option<u8>,
    pub analysis: Option<AnalysisRecord>,
    pub provider: ProviderKind,
    pub model: String,
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        let overall_score = outcome.analysis.as_ref().and_then(|a| a.overall_score);
        let ats_score = outcome.analysis.as_ref().and_then(|a| a.ats_score);
        AnalyzeResponse {
            feedback: outcome.feedback,
            score: overall_score,
            overall_score,
            ats_score,
            analysis: outcome.analysis,
            provider: outcome.provider,
            model: outcome.model,
        }
    }
}

/// POST /api/v1/resume/analyze-text
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeTextRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    if req.text().trim().chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(
            "Resume text is too short. Please upload a PDF or paste more content.".to_string(),
        ));
    }

    let outcome = state
        .dispatcher
        .generate_analysis(req.text(), req.job_description())
        .await?;
    Ok(Json(outcome.into()))
}
