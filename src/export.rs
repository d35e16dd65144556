//! Renderers for stored meetings: a task CSV and Markdown minutes.

use crate::types::{ActionItem, MeetingRecord};

const CSV_HEADER: &str = "task,owner,due_date,priority,confidence,status";

/// Flatten text onto one line for rendering.
///
/// Drops zero-width characters and the byte-order mark, turns line breaks
/// into spaces, and collapses whitespace runs.
pub fn safe_text(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render action items as CSV, one row per item, in record order.
pub fn tasks_csv(items: &[ActionItem]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");
    for item in items {
        let row = [
            csv_field(&item.task),
            csv_field(item.owner.as_deref().unwrap_or("")),
            csv_field(item.due_date.as_deref().unwrap_or("")),
            item.priority.as_str().to_string(),
            item.confidence.to_string(),
            csv_field(item.status.as_str()),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

/// Render a record as Markdown minutes.
pub fn minutes_markdown(record: &MeetingRecord) -> String {
    let mut md = String::new();

    let title = record
        .title
        .as_deref()
        .map(safe_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled Meeting".to_string());
    let date = record
        .date
        .as_deref()
        .map(safe_text)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "N/A".to_string());

    md.push_str("# Meeting Minutes\n\n");
    md.push_str(&format!("**Title:** {}\n", title));
    md.push_str(&format!("**Date:** {}\n\n", date));

    md.push_str("## Summary\n\n");
    md.push_str(&safe_text(&record.summary));
    md.push_str("\n\n");

    md.push_str("## Decisions\n\n");
    if record.decisions.is_empty() {
        md.push_str("- No decisions found.\n");
    }
    for d in &record.decisions {
        md.push_str(&format!("- {}\n", safe_text(d)));
    }
    md.push('\n');

    md.push_str("## Action Items\n\n");
    if record.action_items.is_empty() {
        md.push_str("- No action items found.\n");
    }
    for a in &record.action_items {
        let owner = a
            .owner
            .as_deref()
            .map(safe_text)
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| "Unassigned".to_string());
        md.push_str(&format!("- {}\n", safe_text(&a.task)));
        md.push_str(&format!(
            "  Owner: {} | Due: {} | Priority: {} | Confidence: {} | Status: {}\n",
            owner,
            a.due_date.as_deref().unwrap_or("N/A"),
            a.priority,
            a.confidence,
            a.status
        ));
    }
    md.push('\n');

    md.push_str("## Risks / Blockers\n\n");
    if record.risks_or_blockers.is_empty() {
        md.push_str("- None\n");
    }
    for r in &record.risks_or_blockers {
        md.push_str(&format!("- {}\n", safe_text(r)));
    }

    md
}
