//! Strict validation of the recovered verdict object.
//!
//! Rejects rather than repairs, except where noted: list entries and the
//! summary are coerced to strings, and a falsy summary becomes empty.

use serde_json::{Map, Value};

use crate::evaluation::result::{Decision, EvaluationResult};
use crate::evaluator::EvaluatorError;

pub const REQUIRED_KEYS: [&str; 6] = [
    "technical_score",
    "softskill_score",
    "strengths",
    "weaknesses",
    "summary",
    "decision",
];

pub fn validate_verdict(value: &Value) -> Result<EvaluationResult, EvaluatorError> {
    let object = value
        .as_object()
        .ok_or_else(|| schema_error("Parsed LLM response is not an object"))?;

    for key in REQUIRED_KEYS {
        if !object.contains_key(key) {
            return Err(schema_error(format!(
                "Missing required key \"{key}\" in LLM response"
            )));
        }
    }

    let technical_score = score(object, "technical_score")?;
    let softskill_score = score(object, "softskill_score")?;
    let strengths = string_list(object, "strengths")?;
    let weaknesses = string_list(object, "weaknesses")?;
    let summary = match &object["summary"] {
        v if is_falsy(v) => String::new(),
        v => stringify(v),
    };
    let decision = object["decision"]
        .as_str()
        .and_then(|s| s.parse::<Decision>().ok())
        .ok_or_else(|| schema_error("Decision must be one of: Hire, Maybe, Reject"))?;

    Ok(EvaluationResult::new(
        technical_score,
        softskill_score,
        strengths,
        weaknesses,
        summary,
        decision,
    ))
}

fn schema_error(message: impl Into<String>) -> EvaluatorError {
    EvaluatorError::Schema(message.into())
}

/// Coerces to a number, checks `[0, 100]`, rounds half up.
fn score(object: &Map<String, Value>, key: &str) -> Result<u8, EvaluatorError> {
    coerce_number(&object[key])
        .filter(|n| (0.0..=100.0).contains(n))
        .map(|n| n.round() as u8)
        .ok_or_else(|| schema_error(format!("Key \"{key}\" must be a number between 0 and 100")))
}

/// Numeric coercion for loosely typed model output: numbers pass through,
/// numeric strings are parsed (blank counts as zero), booleans map to 0/1,
/// null is zero. Arrays and objects are not numbers.
fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().ok()?
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

fn string_list(object: &Map<String, Value>, key: &str) -> Result<Vec<String>, EvaluatorError> {
    object[key]
        .as_array()
        .map(|items| items.iter().map(stringify).collect())
        .ok_or_else(|| schema_error(format!("Key \"{key}\" must be an array")))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}
