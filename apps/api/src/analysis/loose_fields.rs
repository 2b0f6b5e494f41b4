//! Last-resort scraping for truncated or otherwise unparseable model output.
//!
//! Recovers `overall_score`, `ats_score` and a best-effort `summary`. List
//! fields are never recovered here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

static OVERALL_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\\?"overall_score\\?"\s*:\s*(-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)"#).expect("valid regex")
});

static ATS_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\\?"ats_score\\?"\s*:\s*(-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)"#).expect("valid regex")
});

/// Group 1 is the backslash in front of an escaped key, if any.
static SUMMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\\?)"summary\\?"\s*:\s*\\?""#).expect("valid regex"));

/// Returns `{overall_score, ats_score, summary}` when at least one score is present.
/// Missing fields are `null`; the result still goes through the normalizer.
pub fn extract_loose_fields(text: &str) -> Option<Value> {
    let overall_score = scrape_score(&OVERALL_SCORE_RE, text);
    let ats_score = scrape_score(&ATS_SCORE_RE, text);

    if overall_score.is_none() && ats_score.is_none() {
        return None;
    }

    Some(json!({
        "overall_score": overall_score,
        "ats_score": ats_score,
        "summary": scrape_summary(text),
    }))
}

fn scrape_score(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Reads the summary string up to its closing quote, or to the end of the
/// text when the response was cut off inside it.
fn scrape_summary(text: &str) -> Option<String> {
    let captures = SUMMARY_KEY_RE.captures(text)?;
    let escaped_quotes = captures.get(1).is_some_and(|m| !m.as_str().is_empty());
    let rest = &text[captures.get(0)?.end()..];

    let fragment = if escaped_quotes {
        // JSON embedded in a JSON string: the value ends at the next `\"`.
        rest.split("\\\"").next().unwrap_or(rest)
    } else {
        &rest[..closing_quote(rest).unwrap_or(rest.len())]
    };

    let summary = serde_json::from_str::<String>(&format!("\"{fragment}\""))
        .unwrap_or_else(|_| fragment.to_string());
    let summary = summary.trim();
    (!summary.is_empty()).then(|| summary.to_string())
}

fn closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, byte) in text.bytes().enumerate() {
        match byte {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'"' => return Some(idx),
            _ => {}
        }
    }
    None
}
