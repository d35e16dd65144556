//! Transcript → meeting record extraction.
//!
//! Owns the whole sequence: clean, prompt, call the model once, salvage the
//! JSON object from whatever came back, normalize, validate, and resolve
//! due dates. Either a complete valid record comes out or an error does.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::error::ExtractionError;
use crate::intelligence::{build_extraction_prompt, TextGenerator, SYSTEM_PROMPT};
use crate::types::MeetingRecord;

use super::dates::resolve_due_date_iso;
use super::normalize::normalize_action_item;
use super::schema::validate_meeting;
use super::transcript::clean_transcript;

/// Default sampling temperature for extraction calls.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Characters of raw model output to include in debug logs.
const RESPONSE_PREVIEW_CHARS: usize = 500;

/// Slice from the first `{` to the last `}` inclusive.
///
/// Tolerates prose or code fences around the JSON. Returns `None` when
/// either brace is missing or they are out of order.
pub fn slice_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

fn preview(text: &str) -> String {
    text.chars().take(RESPONSE_PREVIEW_CHARS).collect()
}

/// Parse raw model text into a JSON value, applying action-item repair.
fn parse_and_normalize(raw: &str) -> Result<Value, ExtractionError> {
    let json_str = slice_json_object(raw).ok_or_else(|| {
        ExtractionError::UnparseableResponse("no JSON object in model output".to_string())
    })?;

    let mut data: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractionError::UnparseableResponse(format!("invalid JSON: {}", e)))?;

    if let Some(Value::Array(items)) = data.get_mut("action_items") {
        let raw_items = std::mem::take(items);
        *items = raw_items.into_iter().map(normalize_action_item).collect();
    }

    Ok(data)
}

/// Turn raw model output into a canonical record, resolving due dates
/// against `now`. Split out from [`extract_meeting_data`] so stored or
/// replayed responses can go through the same path.
pub fn record_from_response(raw: &str, now: NaiveDateTime) -> Result<MeetingRecord, ExtractionError> {
    let data = parse_and_normalize(raw)?;
    let mut record = validate_meeting(data)?;

    let today = now.date();
    for item in &mut record.action_items {
        // The model's own due_date is discarded: only resolver output is trusted.
        item.due_date = resolve_due_date_iso(item.due_date_text.as_deref(), today);
    }

    Ok(record)
}

/// Extract a meeting record from a transcript.
///
/// 1. Clean the transcript
/// 2. Build the system + user prompt
/// 3. Call the model once (no retry here; wrap the generator for that)
/// 4. Slice and parse the JSON object
/// 5. Normalize each action item
/// 6. Validate the whole record
/// 7. Resolve due dates from `due_date_text`
pub fn extract_meeting_data(
    generator: &dyn TextGenerator,
    transcript: &str,
    now: NaiveDateTime,
    temperature: f32,
) -> Result<MeetingRecord, ExtractionError> {
    let cleaned = clean_transcript(transcript);
    log::info!(
        "Extracting meeting data from transcript ({} chars cleaned)",
        cleaned.len()
    );

    let prompt = build_extraction_prompt(&cleaned);
    let raw = generator.complete(SYSTEM_PROMPT, &prompt, temperature)?;

    log::debug!(
        "Model output ({} bytes): {}",
        raw.len(),
        preview(&raw)
    );

    let record = record_from_response(raw.trim(), now)?;

    log::info!(
        "Extracted {} action items, {} decisions, {} risks",
        record.action_items.len(),
        record.decisions.len(),
        record.risks_or_blockers.len()
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday};

    use super::*;
    use crate::intelligence::provider::test_support::StaticGenerator;
    use crate::types::{ActionStatus, Priority};

    fn thursday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    const ALICE_REPLY: &str = r#"{"summary":"Report and ship date agreed.", "decisions":["ship on Monday"], "action_items":[{"task":"finish the report","owner":"Alice","due_date_text":"Friday","priority":null}], "risks_or_blockers":[]}"#;

    #[test]
    fn end_to_end_applies_defaults_and_resolves_friday() {
        let gen = StaticGenerator::replying(ALICE_REPLY);
        let record = extract_meeting_data(
            &gen,
            "Alice will finish the report by Friday. We decided to ship on Monday.",
            thursday_morning(),
            DEFAULT_TEMPERATURE,
        )
        .unwrap();

        assert_eq!(gen.calls.get(), 1);
        let item = &record.action_items[0];
        assert_eq!(item.task, "finish the report");
        assert_eq!(item.owner.as_deref(), Some("Alice"));
        assert_eq!(item.priority, Priority::Medium);
        assert_eq!(item.status, ActionStatus::ToDo);
        assert_eq!(item.confidence, 0.5);
        assert_eq!(item.due_date.as_deref(), Some("2024-03-15"));
        let due = NaiveDate::parse_from_str(item.due_date.as_deref().unwrap(), "%Y-%m-%d").unwrap();
        assert_eq!(due.weekday(), Weekday::Fri);
        assert_eq!(record.decisions, vec!["ship on Monday".to_string()]);
    }

    #[test]
    fn transcript_is_cleaned_before_prompting() {
        let gen = StaticGenerator::replying(ALICE_REPLY);
        extract_meeting_data(
            &gen,
            "Speaker 1: [00:00:05] alice will finish the report.",
            thursday_morning(),
            DEFAULT_TEMPERATURE,
        )
        .unwrap();
        let prompt = gen.last_user_message.borrow();
        assert!(prompt.contains("Alice will finish the report."), "{prompt}");
        assert!(!prompt.contains("Speaker 1"));
        assert_eq!(*gen.last_system_instruction.borrow(), SYSTEM_PROMPT);
    }

    #[test]
    fn tolerates_prose_and_code_fences() {
        let raw = format!("Sure! Here is the JSON:\n```json\n{}\n```\nHope it helps.", ALICE_REPLY);
        let record = record_from_response(&raw, thursday_morning()).unwrap();
        assert_eq!(record.action_items.len(), 1);
    }

    #[test]
    fn model_supplied_due_date_is_discarded() {
        let raw = r#"{"summary":"s","action_items":[
            {"task":"a","due_date_text":"tomorrow","due_date":"2031-01-01","confidence":0.9},
            {"task":"b","due_date_text":"next quarter","due_date":"2024-06-30"},
            {"task":"c","due_date":"2024-04-01"}
        ]}"#;
        let record = record_from_response(raw, thursday_morning()).unwrap();
        assert_eq!(record.action_items[0].due_date.as_deref(), Some("2024-03-15"));
        assert_eq!(record.action_items[1].due_date, None);
        assert_eq!(record.action_items[2].due_date, None);
    }

    #[test]
    fn missing_braces_is_unparseable() {
        let gen = StaticGenerator::replying("I could not find any action items.");
        let err = extract_meeting_data(&gen, "hello", thursday_morning(), 0.2).unwrap_err();
        assert!(matches!(err, ExtractionError::UnparseableResponse(_)));
    }

    #[test]
    fn malformed_json_is_unparseable() {
        let err = record_from_response(r#"{"summary": "x", }"#, thursday_morning()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnparseableResponse(_)));
    }

    #[test]
    fn reversed_braces_are_unparseable() {
        assert_eq!(slice_json_object("} nothing {"), None);
        assert_eq!(slice_json_object("pre {\"a\":1} post"), Some("{\"a\":1}"));
    }

    #[test]
    fn schema_failure_after_normalization_is_reported() {
        // Summary missing: normalization only touches action items.
        let err = record_from_response(r#"{"decisions": []}"#, thursday_morning()).unwrap_err();
        assert!(matches!(err, ExtractionError::SchemaViolation(_)));

        // A non-object action item normalizes to {} and is then rejected.
        let err = record_from_response(r#"{"summary": "s", "action_items": ["call Bob"]}"#, thursday_morning())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::SchemaViolation(_)));
    }

    #[test]
    fn transport_failures_propagate_unchanged() {
        let gen = StaticGenerator::failing(|| ExtractionError::Timeout(120));
        let err = extract_meeting_data(&gen, "hello", thursday_morning(), 0.2).unwrap_err();
        assert!(matches!(err, ExtractionError::Timeout(120)));
    }

    #[test]
    fn every_item_gets_a_distinct_id() {
        let raw = r#"{"summary":"s","action_items":[{"task":"a"},{"task":"b"}]}"#;
        let record = record_from_response(raw, thursday_morning()).unwrap();
        assert_ne!(record.action_items[0].id, record.action_items[1].id);
    }
}
