//! Prompt construction for meeting extraction.
//!
//! The system instruction pins down the output contract. The pipeline's
//! defaults (Medium priority, 0.5 confidence, "To Do" status, resolver-only
//! due dates) assume the model follows it, and repair what it doesn't.

/// Fixed system instruction for the extraction call.
pub const SYSTEM_PROMPT: &str = "\
You are an information extraction engine.
Your job: convert a meeting transcript into structured JSON.

Rules:
- Output ONLY valid JSON. No markdown. No explanation.
- NEVER guess absolute dates.
- If a deadline is relative (e.g. Wednesday, tomorrow, by Friday, in 2 days), copy the phrase into due_date_text and keep due_date null.
- due_date must always be null. Dates are resolved after extraction.
- If no deadline is mentioned, both due_date_text and due_date must be null.
- priority must be one of: Low, Medium, High. If unknown, use Medium.
- confidence must be a number between 0 and 1. If unknown, use 0.5.
- status must be one of: Backlog, To Do, In Progress, Done. If not mentioned, use \"To Do\".
";

/// The exact JSON shape the model must return.
pub const TARGET_SCHEMA: &str = r#"{
  "meeting_title": string|null,
  "date": string|null,
  "summary": string,
  "decisions": [string],
  "action_items": [
    {
      "task": string,
      "owner": string|null,
      "due_date_text": string|null,
      "due_date": null,
      "priority": "Low"|"Medium"|"High",
      "confidence": number,
      "status": "Backlog"|"To Do"|"In Progress"|"Done"
    }
  ],
  "risks_or_blockers": [string]
}"#;

/// Build the user message: the cleaned transcript followed by the schema.
pub fn build_extraction_prompt(transcript: &str) -> String {
    format!(
        "Transcript:\n{}\n\nReturn JSON in this schema:\n{}\n",
        transcript, TARGET_SCHEMA
    )
}
