//! Transcript cleanup applied before any extraction call.
//!
//! Strips speaker labels, timestamps, and stray symbols, and normalizes
//! spacing and sentence capitalization. Pure text in, text out.

use std::sync::OnceLock;

use regex::{Captures, Regex};

// Compile-once regex patterns via OnceLock.
fn re_period_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.(\w)").unwrap())
}

fn re_speaker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bSpeaker(?:\s+\d+)?:\s*").unwrap())
}

fn re_timestamp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d+:\d+:\d+\]\s*").unwrap())
}

fn re_disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.,!?]").unwrap())
}

fn re_space_before_punct() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // No lookahead in `regex`: the trailing space is captured and put back.
    RE.get_or_init(|| Regex::new(r"\s+([.,!?])(\s|$)").unwrap())
}

fn re_sentence_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|[.!?]\s+)(\p{Ll})").unwrap())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean a raw transcript.
///
/// Order matters:
/// 1. Collapse whitespace
/// 2. Space after a period glued to the next word (`end.Next` → `end. Next`)
/// 3. Drop `Speaker:` / `Speaker 2:` labels
/// 4. Drop `[hh:mm:ss]` timestamps
/// 5. Replace anything but word chars, whitespace, and `. , ! ?` with a space
/// 6. Collapse whitespace again
/// 7. Remove whitespace before punctuation
/// 8. Upper-case the first letter of every sentence
pub fn clean_transcript(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let mut cleaned = collapse_whitespace(raw);
    cleaned = re_period_word().replace_all(&cleaned, ". $1").into_owned();
    cleaned = re_speaker().replace_all(&cleaned, "").into_owned();
    cleaned = re_timestamp().replace_all(&cleaned, "").into_owned();
    cleaned = re_disallowed().replace_all(&cleaned, " ").into_owned();
    cleaned = collapse_whitespace(&cleaned);

    // Adjacent matches share the separating space, so repeat until stable.
    while re_space_before_punct().is_match(&cleaned) {
        cleaned = re_space_before_punct()
            .replace_all(&cleaned, "$1$2")
            .into_owned();
    }

    cleaned = re_sentence_start()
        .replace_all(&cleaned, |caps: &Captures| {
            format!("{}{}", &caps[1], caps[2].to_uppercase())
        })
        .into_owned();

    cleaned.trim().to_string()
}
