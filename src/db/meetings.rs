use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};

use super::*;
use crate::types::MeetingRecord;

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed-width UTC so lexical order in SQL is chronological order.
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl MeetingDb {
    // =========================================================================
    // Meetings
    // =========================================================================

    /// Insert a processed meeting and return its row id.
    pub fn create_meeting(
        &self,
        title: Option<&str>,
        transcript: &str,
        record: &MeetingRecord,
    ) -> Result<i64, DbError> {
        self.insert_meeting_at(title, transcript, record, Utc::now())
    }

    pub(crate) fn insert_meeting_at(
        &self,
        title: Option<&str>,
        transcript: &str,
        record: &MeetingRecord,
        at: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        let json = serde_json::to_string(record)?;
        let now = timestamp(at);
        self.conn.execute(
            "INSERT INTO meetings (title, transcript, extracted_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![title, transcript, json, now],
        )?;
        let id = self.conn.last_insert_rowid();
        log::info!("Stored meeting {} ({} action items)", id, record.action_items.len());
        Ok(id)
    }

    /// Fetch one meeting with its record decoded.
    pub fn get_meeting(&self, id: i64) -> Result<DbMeeting, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, transcript, extracted_json, created_at, updated_at
                 FROM meetings WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let (id, title, transcript, json, created_at, updated_at) =
            row.ok_or(DbError::NotFound(id))?;

        Ok(DbMeeting {
            id,
            title,
            transcript,
            record: serde_json::from_str(&json)?,
            created_at,
            updated_at,
        })
    }

    /// All meetings, newest first. Ties on `created_at` fall back to id.
    pub fn list_meetings(&self) -> Result<Vec<MeetingSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, created_at, updated_at
             FROM meetings
             ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(MeetingSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;

        let mut meetings = Vec::new();
        for row in rows {
            meetings.push(row?);
        }
        Ok(meetings)
    }

    /// Replace the stored record. The `title` column follows the record's
    /// own title so history listings stay in step with edits.
    pub fn update_record(&self, id: i64, record: &MeetingRecord) -> Result<(), DbError> {
        let json = serde_json::to_string(record)?;
        let changed = self.conn.execute(
            "UPDATE meetings SET extracted_json = ?1, title = ?2, updated_at = ?3
             WHERE id = ?4",
            params![json, record.title, timestamp(Utc::now()), id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::super::test_utils::test_db;
    use super::*;
    use crate::types::{new_item_id, ActionItem, ActionStatus, Priority};

    fn sample_record(title: Option<&str>) -> MeetingRecord {
        MeetingRecord {
            title: title.map(str::to_string),
            summary: "Quarterly review.".to_string(),
            decisions: vec!["Ship v2".to_string()],
            action_items: vec![ActionItem {
                id: new_item_id(),
                task: "Draft launch post".to_string(),
                owner: Some("Alice".to_string()),
                due_date_text: None,
                due_date: None,
                priority: Priority::High,
                confidence: 0.8,
                status: ActionStatus::ToDo,
            }],
            ..MeetingRecord::default()
        }
    }

    #[test]
    fn test_create_and_get_roundtrip() {
        let db = test_db();
        let record = sample_record(Some("Q2 Review"));
        let id = db.create_meeting(Some("Q2 Review"), "raw text", &record).unwrap();

        let stored = db.get_meeting(id).unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.title.as_deref(), Some("Q2 Review"));
        assert_eq!(stored.transcript, "raw text");
        assert_eq!(stored.record, record);
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let db = test_db();
        assert!(matches!(db.get_meeting(42), Err(DbError::NotFound(42))));
    }

    #[test]
    fn test_list_newest_first_with_id_tiebreak() {
        let db = test_db();
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap();
        let record = sample_record(None);

        let a = db.insert_meeting_at(Some("a"), "t", &record, early).unwrap();
        let b = db.insert_meeting_at(Some("b"), "t", &record, late).unwrap();
        let c = db.insert_meeting_at(Some("c"), "t", &record, late).unwrap();

        let ids: Vec<i64> = db.list_meetings().unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![c, b, a]);
    }

    #[test]
    fn test_update_record_syncs_title() {
        let db = test_db();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let id = db
            .insert_meeting_at(None, "t", &sample_record(None), at)
            .unwrap();

        let mut record = db.get_meeting(id).unwrap().record;
        record.title = Some("Renamed".to_string());
        record.action_items.clear();
        db.update_record(id, &record).unwrap();

        let stored = db.get_meeting(id).unwrap();
        assert_eq!(stored.title.as_deref(), Some("Renamed"));
        assert!(stored.record.action_items.is_empty());
        assert!(stored.updated_at > stored.created_at);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let db = test_db();
        let err = db.update_record(9, &sample_record(None)).unwrap_err();
        assert!(matches!(err, DbError::NotFound(9)));
    }
}
