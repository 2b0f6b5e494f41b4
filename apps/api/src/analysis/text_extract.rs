//! Flattens a provider's `NativeResponse` into one trimmed string.
//!
//! Priority: non-blank aggregate `output_text`, then every text found walking
//! the output tree (joined with newlines), then the first refusal, then "".

use crate::llm_client::{NativeResponse, OutputPart};

pub fn extract_response_text(response: &NativeResponse) -> String {
    if let Some(text) = response
        .output_text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        return text.to_string();
    }

    let mut texts = Vec::new();
    let mut refusal = None;
    for item in &response.output {
        collect_text(item, &mut texts, &mut refusal);
    }

    let joined = texts.join("\n");
    let joined = joined.trim();
    if !joined.is_empty() {
        return joined.to_string();
    }

    refusal.map(|r| r.trim().to_string()).unwrap_or_default()
}

fn collect_text<'a>(
    part: &'a OutputPart,
    texts: &mut Vec<&'a str>,
    refusal: &mut Option<&'a str>,
) {
    if let Some(text) = part.text.as_deref().filter(|t| !t.trim().is_empty()) {
        texts.push(text);
    }
    if refusal.is_none() {
        *refusal = part.refusal.as_deref().filter(|r| !r.trim().is_empty());
    }
    for child in &part.content {
        collect_text(child, texts, refusal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_text_wins() {
        let response = NativeResponse {
            output_text: Some("  {\"a\": 1}  ".to_string()),
            output: vec![OutputPart::text("ignored")],
        };
        assert_eq!(extract_response_text(&response), "{\"a\": 1}");
    }

    #[test]
    fn test_blank_aggregate_does_not_suppress_parts() {
        let response = NativeResponse {
            output_text: Some("   ".to_string()),
            output: vec![OutputPart::with_content(vec![OutputPart::text("from parts")])],
        };
        assert_eq!(extract_response_text(&response), "from parts");
    }

    #[test]
    fn test_parts_are_joined_with_newlines_in_order() {
        let response = NativeResponse {
            output_text: None,
            output: vec![
                OutputPart::text("first"),
                OutputPart::with_content(vec![
                    OutputPart::text("second"),
                    OutputPart::with_content(vec![OutputPart::text("third")]),
                ]),
            ],
        };
        assert_eq!(extract_response_text(&response), "first\nsecond\nthird");
    }

    #[test]
    fn test_text_wins_over_refusal() {
        let response = NativeResponse {
            output_text: None,
            output: vec![OutputPart::with_content(vec![
                OutputPart::refusal("I can't do that"),
                OutputPart::text("{\"overall_score\": 50}"),
            ])],
        };
        assert_eq!(extract_response_text(&response), "{\"overall_score\": 50}");
    }

    #[test]
    fn test_refusal_used_when_no_text() {
        let response = NativeResponse {
            output_text: None,
            output: vec![OutputPart::with_content(vec![OutputPart::refusal(
                "  I can't help with that.  ",
            )])],
        };
        assert_eq!(extract_response_text(&response), "I can't help with that.");
    }

    #[test]
    fn test_blank_parts_are_skipped() {
        let response = NativeResponse {
            output_text: None,
            output: vec![OutputPart::text("  "), OutputPart::text("value")],
        };
        assert_eq!(extract_response_text(&response), "value");
    }

    #[test]
    fn test_empty_response_is_empty_string() {
        assert_eq!(extract_response_text(&NativeResponse::default()), "");
    }
}
