//! Codesync room session manager.
//!
//! Tracks which editor connections are in which room, keeps one shared
//! document per room, relays edits between room members and persists room
//! contents periodically, on last leave and on shutdown.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
