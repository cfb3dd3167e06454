//! UseCase: シャットダウン時の一括保存
//!
//! Registry を draining にして以降の退役を止めてから、全ルームを 1 回ずつ保存し、
//! 定期保存タイマーを停止します。読み込み中のルームは作成完了を待ってから保存します。
//! あるルームの保存に失敗しても残りのルームは続行します。

use std::sync::Arc;

use super::room_registry::RoomRegistry;

/// 一括保存の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    /// 保存を試みたルーム数
    pub attempted: usize,
    /// 保存に失敗したルーム数
    pub failed: usize,
}

pub struct ShutdownFlushUseCase {
    registry: Arc<RoomRegistry>,
}

impl ShutdownFlushUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self) -> FlushReport {
        self.registry.begin_draining();

        let rooms = self.registry.settled_rooms().await;
        tracing::info!("Flushing {} active rooms before shutdown", rooms.len());

        let persister = self.registry.persister();
        let mut report = FlushReport::default();
        for room in rooms {
            room.timer().cancel();

            let content = {
                let state = room.lock().await;
                if state.is_closed() || !room.claim_final_save() {
                    continue;
                }
                state.text()
            };

            report.attempted += 1;
            if let Err(e) = persister.save(room.id(), &content).await {
                report.failed += 1;
                tracing::error!("Failed to save room '{}' during shutdown: {}", room.id(), e);
            }
        }

        tracing::info!(
            "Shutdown flush finished: {} saved, {} failed",
            report.attempted - report.failed,
            report.failed
        );
        report
    }
}
