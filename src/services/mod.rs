//! Service layer: operations over stored meetings, each run as one unit
//! of work against the database.

pub mod actions;
pub mod meetings;
