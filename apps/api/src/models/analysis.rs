use std::fmt;

use serde::Serialize;

/// Which LLM provider produced a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Parses an `AI_PROVIDER` value. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "gemini" => Some(ProviderKind::Gemini),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MAX_RESUME_CHARS: usize = 12_000;
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 8_000;

/// Trimmed, length-bounded input to one analysis. Limits count chars, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    resume_text: String,
    job_description: String,
}

impl GenerationRequest {
    pub fn new(resume_text: &str, job_description: &str) -> Self {
        Self {
            resume_text: truncate_chars(resume_text.trim(), MAX_RESUME_CHARS),
            job_description: truncate_chars(job_description.trim(), MAX_JOB_DESCRIPTION_CHARS),
        }
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn has_job_description(&self) -> bool {
        !self.job_description.is_empty()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Text returned by exactly one provider call (plus at most one fallback call).
///
/// `raw_text` is untrusted: it may be empty, fenced, wrapped in prose, or truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGenerationResult {
    pub raw_text: String,
    pub model: String,
    pub provider: ProviderKind,
}

/// The canonical resume critique.
///
/// Every value of this type is fully well-formed: scores are already clamped
/// into 0..=100 and list entries are plain strings. An analysis that could not
/// be recovered is represented as `Option::<AnalysisRecord>::None`, never as a
/// half-filled record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisRecord {
    pub overall_score: Option<u8>,
    /// Always `None` when no job description was supplied.
    pub ats_score: Option<u8>,
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub matching_keywords: Vec<String>,
    pub formatting_tips: Vec<String>,
    pub action_plan: Vec<String>,
}

impl AnalysisRecord {
    /// The six list sections with their display headers, in render order.
    pub fn sections(&self) -> [(&'static str, &[String]); 6] {
        [
            ("Strengths", self.strengths.as_slice()),
            ("Improvements", self.improvements.as_slice()),
            ("Missing Keywords", self.missing_keywords.as_slice()),
            ("Matching Keywords", self.matching_keywords.as_slice()),
            ("Formatting Tips", self.formatting_tips.as_slice()),
            ("Action Plan", self.action_plan.as_slice()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse_is_case_insensitive() {
        assert_eq!(ProviderKind::parse("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse(" gemini "), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse("claude"), None);
        assert_eq!(ProviderKind::parse(""), None);
    }

    #[test]
    fn test_generation_request_trims_and_truncates() {
        let resume = format!("  {}  ", "a".repeat(MAX_RESUME_CHARS + 500));
        let request = GenerationRequest::new(&resume, "   ");
        assert_eq!(request.resume_text().chars().count(), MAX_RESUME_CHARS);
        assert_eq!(request.job_description(), "");
        assert!(!request.has_job_description());
    }

    #[test]
    fn test_generation_request_truncates_on_char_boundaries() {
        let jd = "é".repeat(MAX_JOB_DESCRIPTION_CHARS + 1);
        let request = GenerationRequest::new("resume", &jd);
        assert_eq!(
            request.job_description().chars().count(),
            MAX_JOB_DESCRIPTION_CHARS
        );
        assert!(request.has_job_description());
    }

    #[test]
    fn test_generation_request_keeps_short_input() {
        let request = GenerationRequest::new("\n Senior engineer \n", "Rust role");
        assert_eq!(request.resume_text(), "Senior engineer");
        assert_eq!(request.job_description(), "Rust role");
    }

    #[test]
    fn test_provider_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ProviderKind::OpenAi).unwrap();
        assert_eq!(json, r#""openai""#);
    }

    #[test]
    fn test_analysis_record_serializes_null_scores() {
        let record = AnalysisRecord {
            overall_score: Some(72),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["overall_score"], 72);
        assert!(value["ats_score"].is_null());
        assert_eq!(value["strengths"], serde_json::json!([]));
    }

    #[test]
    fn test_sections_are_in_render_order() {
        let record = AnalysisRecord::default();
        let headers: Vec<&str> = record.sections().iter().map(|(h, _)| *h).collect();
        assert_eq!(
            headers,
            vec![
                "Strengths",
                "Improvements",
                "Missing Keywords",
                "Matching Keywords",
                "Formatting Tips",
                "Action Plan"
            ]
        );
    }
}
