//! SnapshotRepository の実装
//!
//! - `inmemory`: プロセス内の HashMap（データベース未設定時の既定）
//! - `sqlite`: sqlx による SQLite 実装

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemorySnapshotRepository;
pub use sqlite::SqliteSnapshotRepository;
