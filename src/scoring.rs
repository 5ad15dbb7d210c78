//! Pure score calculation for insight categories.
//!
//! Turns a set of raw per-question response values into a category mean
//! and qualitative band. Malformed or out-of-range values are silently
//! excluded from the mean; they are never an error.

use crate::catalog;
use crate::models::{Band, InsightScore, RawResponseSet};

/// Response values must fall in this inclusive range to be accepted.
const MIN_VALID: f64 = 1.0;
const MAX_VALID: f64 = 5.0;

/// Score one category from a raw response set.
///
/// Returns `None` for an unknown category id. A known category with no
/// acceptable values yields a score with `mean: None` ("no data"), which
/// must never be treated as a numeric zero downstream.
pub fn score_category(category_id: &str, responses: &RawResponseSet) -> Option<InsightScore> {
    let category = catalog::get_insight(category_id)?;

    let mut total = 0.0;
    let mut count = 0usize;

    for question in category.questions {
        if let Some(value) = extract_value(responses, question.id) {
            total += value;
            count += 1;
        }
    }

    let mean = if count > 0 {
        Some(total / count as f64)
    } else {
        None
    };

    Some(InsightScore {
        category_id: category.id.to_string(),
        mean,
        band: mean.map(Band::from_score),
        count,
    })
}

/// Score every registered category against the same response set.
///
/// A malformed response set degrades individual categories to "no data";
/// it never aborts the batch.
pub fn score_all(responses: &RawResponseSet) -> Vec<InsightScore> {
    catalog::catalog()
        .iter()
        .filter_map(|c| score_category(c.id, responses))
        .collect()
}

/// Probe the response set for a question's value.
///
/// Key-naming conventions are tried in order; the first present, non-null
/// key wins even if its value is then rejected.
fn extract_value(responses: &RawResponseSet, question_id: &str) -> Option<f64> {
    let keys = [
        format!("field_{question_id}"),
        format!("field_{question_id}_raw"),
        question_id.to_string(),
        format!("{question_id}_raw"),
    ];

    for key in &keys {
        match responses.get(key) {
            Some(value) if !value.is_null() => return accept(value),
            _ => continue,
        }
    }

    None
}

/// Parse a raw value and accept it only when it is a number in [1,5].
fn accept(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    if parsed.is_nan() || !(MIN_VALID..=MAX_VALID).contains(&parsed) {
        return None;
    }

    Some(parsed)
}
