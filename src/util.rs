use chrono::NaiveDate;

/// Check that `value` is a real calendar date in `YYYY-MM-DD` form.
pub fn is_yyyy_mm_dd(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Trim a form value, mapping blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
