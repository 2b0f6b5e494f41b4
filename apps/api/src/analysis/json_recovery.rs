//! JSON recovery from noisy model output.
//!
//! Tiers, tried in order until one yields a record:
//! 1. `BalancedScan`: first `{` to its matching `}`, skipping braces inside strings
//! 2. `NaiveSlice`: first `{` to the last `}` of the text
//! 3. `LooseFields`: regex scrape of scores and summary
//!
//! Every tier is a pure `&str -> Option<Value>` function; the chain never
//! panics and never returns an error. Anything it cannot recover is `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::analysis::loose_fields::extract_loose_fields;
use crate::analysis::normalizer::normalize_analysis;
use crate::models::analysis::AnalysisRecord;

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```(?:json)?").expect("valid regex"));

/// Which tier recovered the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    BalancedScan,
    NaiveSlice,
    LooseFields,
}

type Extractor = fn(&str) -> Option<Value>;

const STRATEGIES: [(RecoveryStrategy, Extractor); 3] = [
    (RecoveryStrategy::BalancedScan, parse_balanced_object),
    (RecoveryStrategy::NaiveSlice, parse_naive_slice),
    (RecoveryStrategy::LooseFields, extract_loose_fields),
];

/// Runs the tiers in order and returns the first normalized record.
pub fn recover_analysis(
    raw_text: &str,
    has_job_description: bool,
) -> Option<(AnalysisRecord, RecoveryStrategy)> {
    STRATEGIES.iter().find_map(|(strategy, extract)| {
        let record = normalize_analysis(extract(raw_text).as_ref(), has_job_description)?;
        Some((record, *strategy))
    })
}

/// Removes every ``` fence, with or without a `json` tag, and trims.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Returns the first balanced `{...}` slice of `text`.
///
/// Braces between unescaped double quotes do not count toward depth, so a
/// `}` inside a string value never closes the object early. Returns `None`
/// when there is no `{` or the object never closes.
pub fn find_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    // Only ASCII bytes are inspected, so every index we slice at is a char boundary.
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

fn parse_balanced_object(raw_text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(raw_text);
    parse_object(find_balanced_object(&cleaned)?)
}

fn parse_naive_slice(raw_text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(raw_text);
    let first = cleaned.find('{')?;
    let last = cleaned.rfind('}')?;
    if last <= first {
        return None;
    }
    parse_object(&cleaned[first..=last])
}
