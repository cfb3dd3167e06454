//! Utilities shared by the Codesync binaries.

pub mod logger;
pub mod time;
