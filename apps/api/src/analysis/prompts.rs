// Prompt constants and the prompt builder for resume analysis.

use crate::models::analysis::GenerationRequest;

/// System prompt sent with every analysis request. Asks for JSON-only output.
pub const ANALYSIS_SYSTEM: &str = "You are an expert career coach and ATS resume reviewer. \
    Return only valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Marker embedded in place of an absent job description.
pub const NO_JOB_DESCRIPTION: &str = "N/A";

/// Schema and rules block. Resume and job description are appended by `build_prompt`.
const ANALYSIS_INSTRUCTIONS: &str = r#"You are an expert career coach and ATS resume reviewer.
Return ONLY valid JSON with the schema below. Do not include markdown or code fences.

Schema:
{
  "overall_score": number, // integer 0-100
  "ats_score": number | null, // integer 0-100 if a job description is provided
  "summary": string,
  "strengths": string[],
  "improvements": string[],
  "missing_keywords": string[],
  "matching_keywords": string[],
  "formatting_tips": string[],
  "action_plan": string[]
}

Rules:
- Return only the JSON object. No prose before or after it, no markdown fences.
- Give 3-5 items for every list field.
- Be specific, concise, and actionable.
- If no job description is provided, set ats_score to null and missing_keywords and matching_keywords to [].
- Focus on changes that improve ATS compatibility and recruiter readability."#;

/// Renders the user prompt for one analysis.
///
/// `request` is already trimmed and truncated. The resume and job description
/// are spliced in with a single `format!` so text that looks like a template
/// placeholder is never substituted again.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let job_description = if request.has_job_description() {
        request.job_description()
    } else {
        NO_JOB_DESCRIPTION
    };

    format!(
        "{ANALYSIS_INSTRUCTIONS}\n\nRESUME:\n{resume}\n\nJOB_DESCRIPTION:\n{job_description}",
        resume = request.resume_text(),
    )
}
