//! UseCase: ドキュメントの編集
//!
//! ルームのドキュメントを受け取った全文で置き換え、送信者以外の参加者に配信します。
//! 置き換えは後勝ちで、ドキュメントエンジンのマージ機能はこの経路では使いません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, RoomId};

use super::{error::EditCodeError, room_registry::RoomRegistry};

/// 編集のユースケース
pub struct EditCodeUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl EditCodeUseCase {
    pub fn new(registry: Arc<RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 編集を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - 配信先の接続 ID
    /// * `Err(EditCodeError::RoomNotFound)` - ルームが存在しない（呼び出し側は無視してよい）
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        room_id: &RoomId,
        full_text: String,
    ) -> Result<Vec<ConnectionId>, EditCodeError> {
        let Some(room) = self.registry.get(room_id).await else {
            return Err(EditCodeError::RoomNotFound(room_id.to_string()));
        };

        let mut state = room.lock().await;
        if state.is_closed() {
            return Err(EditCodeError::RoomNotFound(room_id.to_string()));
        }

        state.replace_text(&full_text);
        let targets = state.connection_ids_except(sender);
        tracing::debug!(
            "Room '{}' updated by {} ({} bytes), relaying to {} connections",
            room_id,
            sender,
            full_text.len(),
            targets.len()
        );

        let event = RoomEvent::CodeUpdate { full_text };
        if let Err(e) = self.message_pusher.broadcast(targets.clone(), &event).await {
            tracing::warn!("Failed to relay edit in room '{}': {}", room_id, e);
        }

        Ok(targets)
    }
}
