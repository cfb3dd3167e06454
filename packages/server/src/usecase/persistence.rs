//! UseCase: ルーム内容の永続化
//!
//! 永続化ストアへの読み書きはすべて `RoomPersister` を経由します。
//! 各呼び出しには `SessionConfig::store_timeout` の上限が付き、
//! 失敗はログに残すだけでクライアントには伝えません。

use std::{
    future::Future,
    sync::{Arc, Weak},
};

use codesync_shared::time::Clock;
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{
    config::SessionConfig,
    domain::{RepositoryError, RoomId, SnapshotRepository, Timestamp},
};

use super::{error::PersistError, room_registry::ActiveRoom};

/// 永続化ストアへの窓口
pub struct RoomPersister {
    repository: Arc<dyn SnapshotRepository>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl RoomPersister {
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// 保存済みの内容を読み込む
    ///
    /// 保存がない場合、ストアの失敗やタイムアウトの場合は `None`（空のドキュメントで開始）。
    pub async fn load(&self, room_id: &RoomId) -> Option<String> {
        match self.with_timeout(self.repository.find_by_room(room_id)).await {
            Ok(Some(snapshot)) => {
                tracing::debug!("Loaded snapshot for room '{}'", room_id);
                Some(snapshot.content)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    "Failed to load room '{}', starting with an empty document: {}",
                    room_id,
                    e
                );
                None
            }
        }
    }

    /// 内容を保存（現在時刻を last_updated とする）
    pub async fn save(&self, room_id: &RoomId, content: &str) -> Result<(), PersistError> {
        let timestamp = Timestamp::new(self.clock.now_millis());
        self.with_timeout(self.repository.upsert(room_id, content, timestamp))
            .await?;
        tracing::info!("Saved room '{}' ({} bytes)", room_id, content.len());
        Ok(())
    }

    /// ルームの現在の内容を保存
    ///
    /// 内容はルームのロック中に読み取り、保存はロックを離してから行う。
    /// 退役済みのルームは保存しない。
    pub async fn flush(&self, room: &ActiveRoom) -> Result<(), PersistError> {
        let content = {
            let state = room.lock().await;
            if state.is_closed() {
                return Ok(());
            }
            state.text()
        };
        self.save(room.id(), &content).await
    }

    /// ルームの定期保存タスクを起動
    ///
    /// 最初の保存は `save_interval` 経過後。ルームが破棄されるとタスクも終了する。
    pub fn spawn_periodic_flush(self: &Arc<Self>, room: Weak<ActiveRoom>) -> JoinHandle<()> {
        let persister = Arc::clone(self);
        let period = self.config.save_interval;

        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 1 回目の tick は即座に完了するので読み捨てる
            interval.tick().await;

            loop {
                interval.tick().await;

                let Some(room) = room.upgrade() else {
                    break;
                };
                if let Err(e) = persister.flush(&room).await {
                    tracing::warn!("Periodic save failed for room '{}': {}", room.id(), e);
                }
            }
        })
    }

    async fn with_timeout<T>(
        &self,
        operation: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, PersistError> {
        match time::timeout(self.config.store_timeout, operation).await {
            Ok(result) => result.map_err(PersistError::from),
            Err(_) => Err(PersistError::Timeout(self.config.store_timeout)),
        }
    }
}
