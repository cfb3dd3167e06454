//! UseCase: ルームへの入室
//!
//! 1. 接続の表示名を ConnectionDirectory に記録
//! 2. Registry からルームを取得（なければストアから読み込んで作成）
//! 3. 参加者を登録し、ルーム全員（本人を含む）に参加者一覧を通知
//! 4. 本人にだけドキュメント全文を送る
//!
//! 失敗で入室が中断されることはありません。ストアの読み込み失敗は空のルームとして扱います。

use std::sync::Arc;

use codesync_shared::time::Clock;

use crate::domain::{
    ConnectionId, DisplayName, MessagePusher, Participant, RoomEvent, RoomId, Timestamp,
};

use super::{connection_directory::ConnectionDirectory, room_registry::RoomRegistry};

/// 入室のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<RoomRegistry>,
    directory: Arc<ConnectionDirectory>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        directory: Arc<ConnectionDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            directory,
            message_pusher,
            clock,
        }
    }

    /// 入室を実行
    ///
    /// # Returns
    ///
    /// 入室後の参加者一覧（入室順）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
    ) -> Vec<Participant> {
        self.directory
            .record_join(&connection_id, display_name.clone(), &room_id);

        loop {
            let room = self.registry.get_or_create(&room_id).await;
            let mut state = room.lock().await;

            // 直前に最後の参加者が抜けて退役したルームを掴んだ場合は作り直す
            if state.is_closed() {
                tracing::debug!("Room '{}' was retired during join, retrying", room_id);
                drop(state);
                tokio::task::yield_now().await;
                continue;
            }

            let participant = Participant::new(
                connection_id.clone(),
                display_name.clone(),
                Timestamp::new(self.clock.now_millis()),
            );
            state.add_participant(participant.clone());
            let roster = state.roster();

            tracing::info!(
                "'{}' ({}) joined room '{}' ({} participants)",
                display_name.as_str(),
                connection_id,
                room_id,
                roster.len()
            );

            let joined = RoomEvent::Joined {
                roster: roster.clone(),
                new_participant: participant,
            };
            if let Err(e) = self
                .message_pusher
                .broadcast(state.connection_ids(), &joined)
                .await
            {
                tracing::warn!("Failed to broadcast join in room '{}': {}", room_id, e);
            }

            let initial = RoomEvent::CodeUpdate {
                full_text: state.text(),
            };
            if let Err(e) = self.message_pusher.push_to(&connection_id, &initial).await {
                tracing::warn!("Failed to send initial code to {}: {}", connection_id, e);
            }

            return roster;
        }
    }
}
