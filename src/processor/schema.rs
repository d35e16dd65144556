//! Schema validation for extracted meeting data.
//!
//! Runs after normalization. Anything that still doesn't fit the canonical
//! shape is rejected with a [`SchemaViolation`] naming the offending path.

use serde::Deserialize;
use serde_json::Value;

use crate::error::SchemaViolation;
use crate::types::{new_item_id, ActionItem, ActionStatus, MeetingRecord, Priority};

/// Wire shape of one action item as the model produces it. `id` is never
/// taken from the model; every validated item gets a fresh one.
#[derive(Debug, Deserialize)]
struct ActionItemFields {
    task: String,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    due_date_text: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    priority: Priority,
    confidence: f64,
    status: ActionStatus,
}

#[derive(Debug, Deserialize)]
struct MeetingFields {
    #[serde(default)]
    meeting_title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    summary: String,
    #[serde(default)]
    decisions: Vec<String>,
    #[serde(default)]
    action_items: Vec<Value>,
    #[serde(default)]
    risks_or_blockers: Vec<String>,
}

/// Validate a normalized action item mapping.
pub fn validate_action_item(value: &Value) -> Result<ActionItem, SchemaViolation> {
    validate_action_item_at(value, "action_item")
}

fn validate_action_item_at(value: &Value, path: &str) -> Result<ActionItem, SchemaViolation> {
    if !value.is_object() {
        return Err(SchemaViolation::new(path, "expected an object"));
    }

    let fields: ActionItemFields = serde_json::from_value(value.clone())
        .map_err(|e| SchemaViolation::new(path, e.to_string()))?;

    if fields.task.trim().is_empty() {
        return Err(SchemaViolation::new(
            format!("{path}.task"),
            "must not be empty",
        ));
    }

    if !fields.confidence.is_finite() || !(0.0..=1.0).contains(&fields.confidence) {
        return Err(SchemaViolation::new(
            format!("{path}.confidence"),
            format!("{} is outside [0, 1]", fields.confidence),
        ));
    }

    Ok(ActionItem {
        id: new_item_id(),
        task: fields.task,
        owner: fields.owner,
        due_date_text: fields.due_date_text,
        due_date: fields.due_date,
        priority: fields.priority,
        confidence: fields.confidence,
        status: fields.status,
    })
}

/// Validate a whole meeting object: `summary` must be a string (possibly
/// empty), list fields must be lists of the right element type when
/// present, and every action item must pass [`validate_action_item`].
pub fn validate_meeting(value: Value) -> Result<MeetingRecord, SchemaViolation> {
    if !value.is_object() {
        return Err(SchemaViolation::new("$", "expected an object"));
    }

    let fields: MeetingFields =
        serde_json::from_value(value).map_err(|e| SchemaViolation::new("$", e.to_string()))?;

    let action_items = fields
        .action_items
        .iter()
        .enumerate()
        .map(|(i, item)| validate_action_item_at(item, &format!("action_items[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MeetingRecord {
        title: fields.meeting_title,
        date: fields.date,
        summary: fields.summary,
        decisions: fields.decisions,
        action_items,
        risks_or_blockers: fields.risks_or_blockers,
    })
}
