//! Canonical meeting record types.
//!
//! These are the shapes that leave the extraction pipeline and that are
//! stored as JSON documents. Field names are snake_case to match the JSON
//! the model is asked to produce.

use serde::{Deserialize, Serialize};

/// Sentinel task title used when the model omits one.
pub const UNKNOWN_TASK: &str = "Unknown task";

/// Confidence assumed when the model omits or garbles one.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Confidence assigned to manually entered tasks.
pub const MANUAL_CONFIDENCE: f64 = 0.9;

/// Action item priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Exact, case-sensitive match against the three labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == label)
    }
}

/// Action item lifecycle state. Transitions are unconstrained in direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionStatus {
    Backlog,
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl ActionStatus {
    pub const ALL: [ActionStatus; 4] = [
        ActionStatus::Backlog,
        ActionStatus::ToDo,
        ActionStatus::InProgress,
        ActionStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Backlog => "Backlog",
            ActionStatus::ToDo => "To Do",
            ActionStatus::InProgress => "In Progress",
            ActionStatus::Done => "Done",
        }
    }

    /// Exact, case-sensitive match against the four labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a fresh stable identifier for an action item.
pub fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A single action item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Stable identifier. Documents written before ids existed get one on load.
    #[serde(default = "new_item_id")]
    pub id: String,
    pub task: String,
    #[serde(default)]
    pub owner: Option<String>,
    /// The deadline phrase exactly as stated ("Friday", "in 2 days").
    #[serde(default)]
    pub due_date_text: Option<String>,
    /// YYYY-MM-DD, resolved from `due_date_text` or entered manually.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub status: ActionStatus,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

/// Structured minutes for one meeting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeetingRecord {
    #[serde(rename = "meeting_title", default)]
    pub title: Option<String>,
    /// Date as stated in the transcript; never resolved further.
    #[serde(default)]
    pub date: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub risks_or_blockers: Vec<String>,
}

impl MeetingRecord {
    /// Replace the title when the user supplied a non-blank one.
    pub fn apply_user_title(&mut self, title: Option<&str>) {
        if let Some(t) = title.map(str::trim).filter(|t| !t.is_empty()) {
            self.title = Some(t.to_string());
        }
    }

    /// Find an action item's position by its stable id.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.action_items.iter().position(|a| a.id == id)
    }
}
