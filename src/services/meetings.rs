// Meetings service
// Processing a transcript into a stored record, and reading records back.

use chrono::NaiveDateTime;

use crate::db::{DbMeeting, MeetingDb, MeetingSummary};
use crate::error::ServiceError;
use crate::intelligence::TextGenerator;
use crate::processor::extract_meeting_data;
use crate::types::MeetingRecord;

/// Run the extraction pipeline on `transcript` and persist the result.
///
/// A user-supplied title overrides whatever the model proposed; a blank
/// one is ignored. Nothing is stored unless extraction fully succeeds.
pub fn process_transcript(
    db: &MeetingDb,
    generator: &dyn TextGenerator,
    temperature: f32,
    transcript: &str,
    title: Option<&str>,
    now: NaiveDateTime,
) -> Result<(i64, MeetingRecord), ServiceError> {
    if transcript.trim().is_empty() {
        return Err(ServiceError::EmptyTranscript);
    }

    let mut record = extract_meeting_data(generator, transcript, now, temperature)?;
    record.apply_user_title(title);

    let id = db.create_meeting(record.title.as_deref(), transcript, &record)?;
    Ok((id, record))
}

pub fn get_meeting(db: &MeetingDb, meeting_id: i64) -> Result<DbMeeting, ServiceError> {
    Ok(db.get_meeting(meeting_id)?)
}

/// History listing, newest first.
pub fn list_meetings(db: &MeetingDb) -> Result<Vec<MeetingSummary>, ServiceError> {
    Ok(db.list_meetings()?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::test_utils::test_db;
    use crate::error::ExtractionError;
    use crate::intelligence::provider::test_support::StaticGenerator;

    const REPLY: &str = r#"{"meeting_title":"Model Title","summary":"Planning.","decisions":[],
        "action_items":[{"task":"book venue","owner":"Sam","due_date_text":"tomorrow","priority":"High","confidence":0.7}],
        "risks_or_blockers":["budget"]}"#;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn process_stores_record_with_user_title() {
        let db = test_db();
        let gen = StaticGenerator::replying(REPLY);
        let (id, record) =
            process_transcript(&db, &gen, 0.2, "Sam books the venue tomorrow.", Some("Offsite"), now())
                .unwrap();

        assert_eq!(record.title.as_deref(), Some("Offsite"));
        assert_eq!(record.action_items[0].due_date.as_deref(), Some("2024-03-15"));

        let stored = get_meeting(&db, id).unwrap();
        assert_eq!(stored.title.as_deref(), Some("Offsite"));
        assert_eq!(stored.transcript, "Sam books the venue tomorrow.");
        assert_eq!(stored.record, record);
    }

    #[test]
    fn blank_user_title_keeps_model_title() {
        let db = test_db();
        let gen = StaticGenerator::replying(REPLY);
        let (_, record) = process_transcript(&db, &gen, 0.2, "hello", Some("  "), now()).unwrap();
        assert_eq!(record.title.as_deref(), Some("Model Title"));
    }

    #[test]
    fn empty_transcript_skips_model_and_storage() {
        let db = test_db();
        let gen = StaticGenerator::replying(REPLY);
        let err = process_transcript(&db, &gen, 0.2, " \n\t", None, now()).unwrap_err();
        assert!(matches!(err, ServiceError::EmptyTranscript));
        assert_eq!(gen.calls.get(), 0);
        assert!(list_meetings(&db).unwrap().is_empty());
    }

    #[test]
    fn failed_extraction_stores_nothing() {
        let db = test_db();
        let gen = StaticGenerator::failing(|| ExtractionError::Transport("connection refused".into()));
        let err = process_transcript(&db, &gen, 0.2, "hello", None, now()).unwrap_err();
        assert!(err.is_retryable());
        assert!(list_meetings(&db).unwrap().is_empty());
    }

    #[test]
    fn history_is_newest_first() {
        let db = test_db();
        let gen = StaticGenerator::replying(REPLY);
        let (first, _) = process_transcript(&db, &gen, 0.2, "one", Some("First"), now()).unwrap();
        let (second, _) = process_transcript(&db, &gen, 0.2, "two", Some("Second"), now()).unwrap();

        let ids: Vec<i64> = list_meetings(&db).unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second, first]);
    }
}
