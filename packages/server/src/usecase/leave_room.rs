//! UseCase: 切断時の退室
//!
//! 接続が参加していた各ルームについて
//!
//! 1. 参加者から外し、残りの参加者に退室を通知
//! 2. 参加者が 0 人になったら、ルームのロックを保持したまま最終保存を行い、
//!    保存の成否が確定してから Registry から削除する（タイマーも停止）
//! 3. シャットダウン中は削除せず、まだ保存されていないルームだけを保存する
//!
//! 最後に ConnectionDirectory と MessagePusher から接続を取り除きます。

use std::sync::Arc;

use crate::domain::{ConnectionId, DisplayName, MessagePusher, Room, RoomEvent, RoomId};

use super::{
    connection_directory::ConnectionDirectory,
    room_registry::{ActiveRoom, RoomRegistry},
};

/// 1 つのルームからの退室結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDeparture {
    pub room_id: RoomId,
    /// 退室通知を送った接続
    pub notified: Vec<ConnectionId>,
    /// ルームが空になり破棄されたかどうか
    pub retired: bool,
}

/// 退室処理の結果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaveOutcome {
    /// 接続の表示名（入室前に切断した場合は None）
    pub display_name: Option<DisplayName>,
    pub rooms: Vec<RoomDeparture>,
}

/// 退室のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<RoomRegistry>,
    directory: Arc<ConnectionDirectory>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        directory: Arc<ConnectionDirectory>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            directory,
            message_pusher,
        }
    }

    /// 退室を実行
    pub async fn execute(&self, connection_id: &ConnectionId) -> LeaveOutcome {
        let Some(entry) = self.directory.get(connection_id) else {
            self.message_pusher.unregister_client(connection_id).await;
            return LeaveOutcome::default();
        };

        let mut departures = Vec::with_capacity(entry.rooms.len());
        for room_id in &entry.rooms {
            if let Some(departure) = self
                .leave_room(connection_id, &entry.display_name, room_id)
                .await
            {
                departures.push(departure);
            }
        }

        self.directory.remove(connection_id);
        self.message_pusher.unregister_client(connection_id).await;

        tracing::info!(
            "'{}' ({}) disconnected",
            entry.display_name.as_str(),
            connection_id
        );

        LeaveOutcome {
            display_name: Some(entry.display_name),
            rooms: departures,
        }
    }

    async fn leave_room(
        &self,
        connection_id: &ConnectionId,
        display_name: &DisplayName,
        room_id: &RoomId,
    ) -> Option<RoomDeparture> {
        let room = self.registry.get(room_id).await?;
        let mut state = room.lock().await;

        state.remove_participant(connection_id)?;
        let notified = state.connection_ids();

        let event = RoomEvent::MemberLeft {
            connection_id: connection_id.clone(),
            display_name: display_name.clone(),
        };
        if let Err(e) = self.message_pusher.broadcast(notified.clone(), &event).await {
            tracing::warn!("Failed to notify departure in room '{}': {}", room_id, e);
        }

        let retired = state.is_empty() && self.retire(&room, &mut state).await;

        Some(RoomDeparture {
            room_id: room_id.clone(),
            notified,
            retired,
        })
    }

    /// 空になったルームを保存してから破棄する
    ///
    /// ルームのロック中に呼ぶこと。シャットダウン中は破棄せず、ShutdownFlush がまだ
    /// 保存していないルームだけを保存する。
    async fn retire(&self, room: &ActiveRoom, state: &mut Room) -> bool {
        if state.is_closed() {
            return false;
        }

        if self.registry.is_draining() {
            if room.claim_final_save() {
                self.final_save(room, state).await;
            }
            return false;
        }

        self.final_save(room, state).await;
        state.close();
        self.registry.remove(room.id()).await;
        tracing::info!("Room '{}' is empty and was retired", room.id());
        true
    }

    async fn final_save(&self, room: &ActiveRoom, state: &Room) {
        if let Err(e) = self
            .registry
            .persister()
            .save(room.id(), &state.text())
            .await
        {
            tracing::warn!("Final save failed for room '{}': {}", room.id(), e);
        }
    }
}
