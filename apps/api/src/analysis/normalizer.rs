//! Analysis normalizer. Turns an untrusted parsed JSON value into an `AnalysisRecord`.
//!
//! Rules:
//! - non-object input → `None`
//! - scores: first non-null alias, numbers or numeric strings, rounded, clamped to 0..=100
//! - `ats_score` is always `None` without a job description
//! - list fields: arrays only; falsy entries dropped, the rest stringified, order kept
//! - `summary`: stringified when truthy, else ""

use serde_json::{Map, Value};

use crate::models::analysis::AnalysisRecord;

const OVERALL_SCORE_KEYS: [&str; 3] = ["overall_score", "overallScore", "score"];
const ATS_SCORE_KEYS: [&str; 2] = ["ats_score", "atsScore"];

pub fn normalize_analysis(raw: Option<&Value>, has_job_description: bool) -> Option<AnalysisRecord> {
    let object = raw?.as_object()?;
    let list = |key: &str| normalize_list(object.get(key));

    Some(AnalysisRecord {
        overall_score: coerce_score(first_present(object, &OVERALL_SCORE_KEYS)),
        ats_score: if has_job_description {
            coerce_score(first_present(object, &ATS_SCORE_KEYS))
        } else {
            None
        },
        summary: object
            .get("summary")
            .filter(|v| is_truthy(v))
            .map(stringify)
            .unwrap_or_default(),
        strengths: list("strengths"),
        improvements: list("improvements"),
        missing_keywords: list("missing_keywords"),
        matching_keywords: list("matching_keywords"),
        formatting_tips: list("formatting_tips"),
        action_plan: list("action_plan"),
    })
}

fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| object.get(*key).filter(|v| !v.is_null()))
}

fn coerce_score(value: Option<&Value>) -> Option<u8> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 100.0) as u8)
}

fn normalize_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| is_truthy(item))
            .map(stringify)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or_default();
                // integral floats render without the trailing ".0"
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    (f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
        other => other.to_string(),
    }
}
