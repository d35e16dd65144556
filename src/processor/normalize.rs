//! Best-effort repair of raw action items from model output.
//!
//! The model is asked for strict JSON but routinely returns nulls, free-text
//! priorities, confidence as a string, or nothing at all for optional fields.
//! `normalize_action_item` fixes what can be fixed so the schema validator
//! only ever rejects genuinely unusable data.

use serde_json::{Map, Value};

use crate::types::{ActionStatus, Priority, DEFAULT_CONFIDENCE, UNKNOWN_TASK};

/// Python-style truthiness, which is what "missing task" means for model
/// output: null, false, 0, and empty strings/arrays/objects all count.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Coerce a confidence value to a float, if possible. Infinities count as
/// coerced and are clamped by the caller; NaN does not.
fn coerce_confidence(value: Option<&Value>) -> Option<f64> {
    let f = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    (!f.is_nan()).then_some(f)
}

fn is_label(value: Option<&Value>, valid: impl Fn(&str) -> bool) -> bool {
    value.and_then(Value::as_str).is_some_and(valid)
}

/// Repair one raw action item. Total: never fails.
///
/// Non-object input yields an empty object, which validation then rejects;
/// a task can't be invented from nothing.
pub fn normalize_action_item(raw: Value) -> Value {
    let mut item = match raw {
        Value::Object(map) => map,
        other => {
            log::debug!("normalize: dropping non-object action item: {}", other);
            return Value::Object(Map::new());
        }
    };

    if item.get("task").map_or(true, is_falsy) {
        log::debug!("normalize: missing task, using sentinel");
        item.insert("task".into(), Value::String(UNKNOWN_TASK.into()));
    }

    // Explicit values (even empty strings) are left for the validator.
    for key in ["owner", "due_date_text", "due_date"] {
        item.entry(key).or_insert(Value::Null);
    }

    if !is_label(item.get("priority"), |p| Priority::from_label(p).is_some()) {
        log::debug!(
            "normalize: priority {:?} replaced with Medium",
            item.get("priority")
        );
        item.insert(
            "priority".into(),
            Value::String(Priority::Medium.as_str().into()),
        );
    }

    let confidence = coerce_confidence(item.get("confidence"))
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);
    item.insert("confidence".into(), Value::from(confidence));

    if !is_label(item.get("status"), |s| ActionStatus::from_label(s).is_some()) {
        item.insert(
            "status".into(),
            Value::String(ActionStatus::ToDo.as_str().into()),
        );
    }

    Value::Object(item)
}
