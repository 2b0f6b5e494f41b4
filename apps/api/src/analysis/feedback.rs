//! Renders an `AnalysisRecord` as plain multi-section text.
//!
//! The output is derived and never stored as the source of truth; it can be
//! regenerated from the record at any time.

use crate::models::analysis::AnalysisRecord;

pub fn format_feedback(analysis: Option<&AnalysisRecord>) -> String {
    let Some(analysis) = analysis else {
        return String::new();
    };

    let mut lines: Vec<String> = Vec::new();

    if let Some(score) = analysis.overall_score {
        lines.push(format!("Overall Score: {score}/100"));
    }
    if let Some(score) = analysis.ats_score {
        lines.push(format!("ATS Match Score: {score}/100"));
    }
    if !analysis.summary.is_empty() {
        lines.push(String::new());
        lines.push("Summary:".to_string());
        lines.push(analysis.summary.clone());
    }

    for (header, items) in analysis.sections() {
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{header}:"));
        lines.extend(items.iter().map(|item| format!("- {item}")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisRecord {
        AnalysisRecord {
            overall_score: Some(88),
            ats_score: Some(64),
            summary: "Solid.".to_string(),
            strengths: vec!["Clear structure".to_string()],
            missing_keywords: vec!["Kubernetes".to_string()],
            matching_keywords: vec!["Python".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_none_formats_as_empty() {
        assert_eq!(format_feedback(None), "");
    }

    #[test]
    fn test_full_layout() {
        let expected = "Overall Score: 88/100\n\
            ATS Match Score: 64/100\n\
            \n\
            Summary:\n\
            Solid.\n\
            \n\
            Strengths:\n\
            - Clear structure\n\
            \n\
            Missing Keywords:\n\
            - Kubernetes\n\
            \n\
            Matching Keywords:\n\
            - Python";
        assert_eq!(format_feedback(Some(&sample())), expected);
    }

    #[test]
    fn test_null_scores_and_empty_summary_are_omitted() {
        let record = AnalysisRecord {
            action_plan: vec!["Add metrics".to_string(), "Trim to one page".to_string()],
            ..Default::default()
        };
        assert_eq!(
            format_feedback(Some(&record)),
            "\nAction Plan:\n- Add metrics\n- Trim to one page"
        );
    }

    #[test]
    fn test_empty_record_is_empty_text() {
        assert_eq!(format_feedback(Some(&AnalysisRecord::default())), "");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let record = sample();
        assert_eq!(format_feedback(Some(&record)), format_feedback(Some(&record)));
    }
}
