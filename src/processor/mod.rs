//! Transcript extraction pipeline.
//!
//! Data flows one way: raw transcript → cleaned transcript → model prompt →
//! raw model text → parsed JSON → per-item normalization → schema
//! validation → due-date resolution → canonical [`MeetingRecord`].
//!
//! Everything except the model call in `extract` is pure and safe to use
//! from any number of threads.
//!
//! [`MeetingRecord`]: crate::types::MeetingRecord

pub mod dates;
pub mod extract;
pub mod normalize;
pub mod schema;
pub mod transcript;

pub use dates::{resolve_due_date, resolve_due_date_iso};
pub use extract::{extract_meeting_data, record_from_response, DEFAULT_TEMPERATURE};
pub use normalize::normalize_action_item;
pub use schema::{validate_action_item, validate_meeting};
pub use transcript::clean_transcript;
