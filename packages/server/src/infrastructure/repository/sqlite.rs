//! SQLite SnapshotRepository 実装
//!
//! sqlx の `SqlitePool` を使い、`room_snapshots` テーブルにルームごとの
//! 最新内容を 1 行で保持します。
//!
//! ```text
//! room_snapshots
//!   room_id      TEXT PRIMARY KEY
//!   content      TEXT NOT NULL
//!   last_updated INTEGER NOT NULL   -- Unix ミリ秒
//! ```

use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions};

use crate::domain::{RepositoryError, RoomId, RoomSnapshot, SnapshotRepository, Timestamp};

fn storage_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

/// SQLite SnapshotRepository 実装
#[derive(Debug, Clone)]
pub struct SqliteSnapshotRepository {
    pool: SqlitePool,
}

impl SqliteSnapshotRepository {
    /// データベースに接続し、スキーマを初期化する
    ///
    /// `database_url` の例: `sqlite://codesync.db?mode=rwc`, `sqlite::memory:`
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        // インメモリ DB は接続ごとに別物になるため 1 本に固定する
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(storage_error)?;

        let repository = Self { pool };
        repository.initialize_schema().await?;
        Ok(repository)
    }

    /// テーブルを作成（冪等）
    pub async fn initialize_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS room_snapshots (
                room_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                last_updated INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotRepository for SqliteSnapshotRepository {
    async fn find_by_room(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, RepositoryError> {
        let row = sqlx::query("SELECT content, last_updated FROM room_snapshots WHERE room_id = ?")
            .bind(room_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(|row| {
            Ok(RoomSnapshot {
                room_id: room_id.clone(),
                content: row.try_get::<String, _>("content").map_err(storage_error)?,
                last_updated: Timestamp::new(
                    row.try_get::<i64, _>("last_updated").map_err(storage_error)?,
                ),
            })
        })
        .transpose()
    }

    async fn upsert(
        &self,
        room_id: &RoomId,
        content: &str,
        timestamp: Timestamp,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO room_snapshots (room_id, content, last_updated) VALUES (?, ?, ?)
             ON CONFLICT(room_id) DO UPDATE SET
                content = excluded.content,
                last_updated = excluded.last_updated",
        )
        .bind(room_id.as_str())
        .bind(content)
        .bind(timestamp.value())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}
