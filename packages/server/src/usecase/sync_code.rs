//! UseCase: 同期要求
//!
//! 要求に含まれる全文をそのまま要求元の接続にだけ送り返します。
//! ルームの状態は変更せず、他の参加者にも配信しません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, RoomId};

use super::{error::SyncCodeError, room_registry::RoomRegistry};

pub struct SyncCodeUseCase {
    registry: Arc<RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SyncCodeUseCase {
    pub fn new(registry: Arc<RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    pub async fn execute(
        &self,
        requester: &ConnectionId,
        room_id: &RoomId,
        full_text: String,
    ) -> Result<(), SyncCodeError> {
        if self.registry.get(room_id).await.is_none() {
            return Err(SyncCodeError::RoomNotFound(room_id.to_string()));
        }

        let event = RoomEvent::CodeUpdate { full_text };
        self.message_pusher
            .push_to(requester, &event)
            .await
            .map_err(|e| SyncCodeError::PushFailed(e.to_string()))
    }
}
