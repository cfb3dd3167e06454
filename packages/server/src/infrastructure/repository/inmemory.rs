//! InMemory SnapshotRepository 実装
//!
//! ドメイン層が定義する SnapshotRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。プロセス終了で内容は失われるため、
//! 開発時とテスト用です。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, RoomId, RoomSnapshot, SnapshotRepository, Timestamp};

/// インメモリ SnapshotRepository 実装
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    snapshots: Mutex<HashMap<RoomId, RoomSnapshot>>,
}

impl InMemorySnapshotRepository {
    /// 新しい InMemorySnapshotRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みのルーム数
    pub async fn len(&self) -> usize {
        self.snapshots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.lock().await.is_empty()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn find_by_room(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, RepositoryError> {
        let snapshots = self.snapshots.lock().await;
        Ok(snapshots.get(room_id).cloned())
    }

    async fn upsert(
        &self,
        room_id: &RoomId,
        content: &str,
        timestamp: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut snapshots = self.snapshots.lock().await;
        snapshots.insert(
            room_id.clone(),
            RoomSnapshot {
                room_id: room_id.clone(),
                content: content.to_string(),
                last_updated: timestamp,
            },
        );
        Ok(())
    }
}
