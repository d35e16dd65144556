// Actions service
// Lifecycle rules for action items on an existing record: bulk edit,
// single-field status transitions, and manual task addition. Every
// operation either fully applies or leaves the record untouched.

use serde::Deserialize;

use crate::db::MeetingDb;
use crate::error::{LifecycleError, ServiceError};
use crate::types::{
    new_item_id, ActionItem, ActionStatus, MeetingRecord, Priority, MANUAL_CONFIDENCE,
};
use crate::util::{is_yyyy_mm_dd, non_blank};

/// One row of a bulk edit. Blank and absent values are treated alike,
/// the way an edit form submits them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionItemEdit {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A bulk edit of a whole record.
///
/// Rows match items by position. An item with no row keeps every field,
/// owner and due date included; an empty row `{}` is what clears them,
/// the same as a form submitted with those fields blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingEdit {
    /// `None` leaves the title alone; blank clears it.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub action_items: Vec<ActionItemEdit>,
}

/// Fields for a manually added task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewActionItem {
    pub task: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn parse_status(value: &str) -> Result<ActionStatus, LifecycleError> {
    ActionStatus::from_label(value.trim())
        .ok_or_else(|| LifecycleError::InvalidStatus(value.to_string()))
}

fn checked_due_date(value: Option<&str>) -> Result<Option<String>, LifecycleError> {
    match non_blank(value) {
        Some(d) if !is_yyyy_mm_dd(&d) => Err(LifecycleError::InvalidDate(d)),
        other => Ok(other),
    }
}

/// Merge a submitted edit row into the stored item, field by field.
///
/// - `task`, `priority`, `status`: blank keeps the previous value
/// - `owner`, `due_date`: blank clears
/// - `id`, `confidence`, `due_date_text`: never edited here
pub fn merge_action_item(
    previous: &ActionItem,
    submitted: &ActionItemEdit,
) -> Result<ActionItem, LifecycleError> {
    let task = non_blank(submitted.task.as_deref()).unwrap_or_else(|| previous.task.clone());

    // The edit form only offers the three labels; anything else keeps the stored value.
    let priority = non_blank(submitted.priority.as_deref())
        .and_then(|p| Priority::from_label(&p))
        .unwrap_or(previous.priority);

    let status = match non_blank(submitted.status.as_deref()) {
        Some(s) => parse_status(&s)?,
        None => previous.status,
    };

    Ok(ActionItem {
        task,
        owner: non_blank(submitted.owner.as_deref()),
        due_date: checked_due_date(submitted.due_date.as_deref())?,
        priority,
        status,
        ..previous.clone()
    })
}

/// Apply a bulk edit. Rows past the end of the list are ignored; items
/// without a row are left as they are.
pub fn apply_meeting_edit(
    record: &mut MeetingRecord,
    edit: &MeetingEdit,
) -> Result<(), LifecycleError> {
    let merged = record
        .action_items
        .iter()
        .zip(&edit.action_items)
        .map(|(previous, row)| merge_action_item(previous, row))
        .collect::<Result<Vec<_>, _>>()?;

    if edit.action_items.len() > record.action_items.len() {
        log::debug!(
            "Ignoring {} edit rows past the end of the action item list",
            edit.action_items.len() - record.action_items.len()
        );
    }

    for (slot, item) in record.action_items.iter_mut().zip(merged) {
        *slot = item;
    }
    if let Some(title) = &edit.title {
        record.title = non_blank(Some(title.as_str()));
    }
    Ok(())
}

/// Change the status of the item at `index`, touching nothing else.
pub fn set_status(
    record: &mut MeetingRecord,
    index: usize,
    status: &str,
) -> Result<(), LifecycleError> {
    let status = parse_status(status)?;
    let len = record.action_items.len();
    let item = record
        .action_items
        .get_mut(index)
        .ok_or(LifecycleError::IndexOutOfRange { index, len })?;
    item.status = status;
    Ok(())
}

/// Change the status of the item with stable id `id`.
pub fn set_status_by_id(
    record: &mut MeetingRecord,
    id: &str,
    status: &str,
) -> Result<(), LifecycleError> {
    let index = record
        .position_of(id)
        .ok_or_else(|| LifecycleError::UnknownItem(id.to_string()))?;
    set_status(record, index, status)
}

/// Build a manually entered action item. Missing priority → Medium,
/// missing or unknown status → To Do, confidence fixed at 0.9, and no
/// `due_date_text` since manual entries carry their date directly.
pub fn new_action_item(new: &NewActionItem) -> Result<ActionItem, LifecycleError> {
    let task = non_blank(Some(new.task.as_str())).ok_or(LifecycleError::MissingTask)?;

    Ok(ActionItem {
        id: new_item_id(),
        task,
        owner: non_blank(new.owner.as_deref()),
        due_date_text: None,
        due_date: checked_due_date(new.due_date.as_deref())?,
        priority: new
            .priority
            .as_deref()
            .and_then(|p| Priority::from_label(p.trim()))
            .unwrap_or_default(),
        confidence: MANUAL_CONFIDENCE,
        status: new
            .status
            .as_deref()
            .and_then(|s| ActionStatus::from_label(s.trim()))
            .unwrap_or_default(),
    })
}

/// Append a manually entered item. Returns the new item.
pub fn append_action_item<'a>(
    record: &'a mut MeetingRecord,
    new: &NewActionItem,
) -> Result<&'a ActionItem, LifecycleError> {
    let item = new_action_item(new)?;
    record.action_items.push(item);
    Ok(&record.action_items[record.action_items.len() - 1])
}

// =============================================================================
// Stored-record operations (read-modify-write inside one transaction)
// =============================================================================

/// Where a status change is aimed: by position, or by stable id.
#[derive(Debug, Clone)]
pub enum ItemRef {
    Index(usize),
    Id(String),
}

/// Change one item's status in a stored meeting.
pub fn update_status(
    db: &MeetingDb,
    meeting_id: i64,
    target: &ItemRef,
    status: &str,
) -> Result<ActionItem, ServiceError> {
    db.with_transaction(|db| {
        let mut meeting = db.get_meeting(meeting_id)?;
        let index = match target {
            ItemRef::Index(i) => *i,
            ItemRef::Id(id) => meeting
                .record
                .position_of(id)
                .ok_or_else(|| LifecycleError::UnknownItem(id.clone()))?,
        };
        set_status(&mut meeting.record, index, status)?;
        db.update_record(meeting_id, &meeting.record)?;
        log::info!(
            "Meeting {}: action item {} set to '{}'",
            meeting_id,
            index,
            status
        );
        Ok(meeting.record.action_items[index].clone())
    })
}

/// Add a manual task to a stored meeting.
pub fn add_action_item(
    db: &MeetingDb,
    meeting_id: i64,
    new: &NewActionItem,
) -> Result<ActionItem, ServiceError> {
    db.with_transaction(|db| {
        let mut meeting = db.get_meeting(meeting_id)?;
        let item = append_action_item(&mut meeting.record, new)?.clone();
        db.update_record(meeting_id, &meeting.record)?;
        log::info!("Meeting {}: added action item '{}'", meeting_id, item.task);
        Ok(item)
    })
}

/// Apply a bulk edit to a stored meeting.
pub fn edit_meeting(
    db: &MeetingDb,
    meeting_id: i64,
    edit: &MeetingEdit,
) -> Result<MeetingRecord, ServiceError> {
    db.with_transaction(|db| {
        let mut meeting = db.get_meeting(meeting_id)?;
        apply_meeting_edit(&mut meeting.record, edit)?;
        db.update_record(meeting_id, &meeting.record)?;
        log::info!("Meeting {}: saved bulk edit", meeting_id);
        Ok(meeting.record)
    })
}
