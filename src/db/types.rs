//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::MeetingRecord;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Stored record could not be (de)serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Meeting {0} not found")]
    NotFound(i64),
}

/// A row from the `meetings` table with its record decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbMeeting {
    pub id: i64,
    pub title: Option<String>,
    pub transcript: String,
    pub record: MeetingRecord,
    pub created_at: String,
    pub updated_at: String,
}

/// Lightweight history row: no transcript, no decoded record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSummary {
    pub id: i64,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
