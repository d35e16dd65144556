//! Meeting transcripts in, structured minutes out.
//!
//! `processor` turns a raw transcript into a validated [`types::MeetingRecord`]
//! with the help of a [`intelligence::TextGenerator`]; `services` store those
//! records and apply user edits to them; `export` renders them.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod intelligence;
mod migrations;
pub mod processor;
pub mod services;
pub mod types;
pub mod util;
