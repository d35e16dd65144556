//! Relative deadline resolution.
//!
//! Maps phrases like "tomorrow", "in 2 days", or "by Friday" onto calendar
//! dates against a reference date. Anything unrecognized stays unresolved;
//! the model is never trusted to produce absolute dates itself.

use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;

/// Weekday names in tie-break order: when a phrase names several days,
/// the first one in this list wins.
const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

fn re_in_days() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"in\s+(\d+)\s+days?").unwrap())
}

/// Next occurrence of `target` strictly after `base`. Same weekday means a
/// full week ahead. `None` only past the end of the calendar.
pub fn next_weekday(target: Weekday, base: NaiveDate) -> Option<NaiveDate> {
    let current = base.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();
    let days_ahead = (wanted + 7 - current - 1) % 7 + 1;
    base.checked_add_days(Days::new(u64::from(days_ahead)))
}

/// Resolve a deadline phrase to a date. First matching rule wins:
///
/// 1. exactly "today"
/// 2. exactly "tomorrow"
/// 3. "in N day(s)" anywhere in the phrase
/// 4. a weekday name anywhere in the phrase (next occurrence, never same day)
///
/// Matching is case-insensitive. Returns `None` for empty or unrecognized text.
pub fn resolve_due_date(text: Option<&str>, reference: NaiveDate) -> Option<NaiveDate> {
    let t = text?.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }

    if t == "today" {
        return Some(reference);
    }

    if t == "tomorrow" {
        return reference.checked_add_days(Days::new(1));
    }

    if let Some(caps) = re_in_days().captures(&t) {
        // Digit strings too large for u64 can't be a real deadline.
        let n: u64 = caps[1].parse().ok()?;
        return reference.checked_add_days(Days::new(n));
    }

    WEEKDAYS
        .iter()
        .find(|(name, _)| t.contains(name))
        .and_then(|(_, day)| next_weekday(*day, reference))
}

/// Same as [`resolve_due_date`], formatted as `YYYY-MM-DD`.
pub fn resolve_due_date_iso(text: Option<&str>, reference: NaiveDate) -> Option<String> {
    resolve_due_date(text, reference).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-14 is a Thursday.
    fn thursday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    fn iso(text: &str) -> Option<String> {
        resolve_due_date_iso(Some(text), thursday())
    }

    #[test]
    fn today_and_tomorrow() {
        assert_eq!(iso("today").as_deref(), Some("2024-03-14"));
        assert_eq!(iso("tomorrow").as_deref(), Some("2024-03-15"));
        assert_eq!(iso("  Tomorrow ").as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn today_must_match_exactly() {
        // "by today" is not the exact phrase and names no weekday.
        assert_eq!(iso("by today"), None);
    }

    #[test]
    fn in_n_days() {
        assert_eq!(iso("in 2 days").as_deref(), Some("2024-03-16"));
        assert_eq!(iso("in 1 day").as_deref(), Some("2024-03-15"));
        assert_eq!(iso("due IN 10 DAYS").as_deref(), Some("2024-03-24"));
        assert_eq!(iso("in 0 days").as_deref(), Some("2024-03-14"));
    }

    #[test]
    fn in_n_days_matches_inside_words() {
        assert_eq!(iso("within 3 days").as_deref(), Some("2024-03-17"));
        assert_eq!(iso("in 3 days").as_deref(), Some("2024-03-17"));
    }

    #[test]
    fn weekday_at_end_of_calendar_is_unresolvable() {
        assert_eq!(next_weekday(Weekday::Mon, NaiveDate::MAX), None);
        assert_eq!(resolve_due_date(Some("monday"), NaiveDate::MAX), None);
    }

    #[test]
    fn in_n_days_crosses_month_and_year() {
        let base = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(
            resolve_due_date_iso(Some("in 3 days"), base).as_deref(),
            Some("2025-01-02")
        );
    }

    #[test]
    fn absurd_day_counts_are_unresolvable() {
        assert_eq!(iso("in 99999999999999999999999 days"), None);
        assert_eq!(iso("in 9999999999 days"), None);
    }

    #[test]
    fn weekday_is_next_occurrence() {
        assert_eq!(iso("Wednesday").as_deref(), Some("2024-03-20"));
        assert_eq!(iso("by Friday").as_deref(), Some("2024-03-15"));
        assert_eq!(iso("sunday evening").as_deref(), Some("2024-03-17"));
    }

    #[test]
    fn same_weekday_advances_a_full_week() {
        assert_eq!(iso("Thursday").as_deref(), Some("2024-03-21"));
    }

    #[test]
    fn multiple_weekdays_resolve_to_first_in_week_order() {
        // Friday is mentioned first, but Tuesday comes first in Mon..Sun order.
        assert_eq!(iso("Friday or Tuesday").as_deref(), Some("2024-03-19"));
    }

    #[test]
    fn relative_rule_beats_weekday() {
        assert_eq!(iso("in 2 days, before Monday").as_deref(), Some("2024-03-16"));
    }

    #[test]
    fn unknown_phrases_stay_unresolved() {
        assert_eq!(iso("next quarter"), None);
        assert_eq!(iso("ASAP"), None);
        assert_eq!(iso("15 Jan"), None);
        assert_eq!(resolve_due_date(None, thursday()), None);
        assert_eq!(resolve_due_date(Some(""), thursday()), None);
    }

    #[test]
    fn resolved_dates_never_precede_reference() {
        for phrase in ["today", "tomorrow", "in 5 days", "monday", "thursday", "saturday"] {
            let d = resolve_due_date(Some(phrase), thursday()).unwrap();
            assert!(d >= thursday(), "{phrase} resolved to {d}");
        }
    }
}
