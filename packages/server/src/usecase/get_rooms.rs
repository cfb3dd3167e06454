//! UseCase: アクティブなルームの参照（HTTP API 用）

use std::sync::Arc;

use crate::domain::{Participant, RoomId, Timestamp};

use super::{
    error::GetRoomDetailError,
    room_registry::{ActiveRoom, RoomRegistry},
};

/// ルームの概要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOverview {
    pub id: RoomId,
    pub created_at: Timestamp,
    /// 参加者（入室順）
    pub participants: Vec<Participant>,
}

async fn overview(room: &ActiveRoom) -> Option<RoomOverview> {
    let state = room.lock().await;
    if state.is_closed() {
        return None;
    }
    Some(RoomOverview {
        id: state.id.clone(),
        created_at: state.created_at,
        participants: state.roster(),
    })
}

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<RoomRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// アクティブなルームを ID 順に返す
    pub async fn execute(&self) -> Vec<RoomOverview> {
        let mut overviews = Vec::new();
        for room in self.registry.active_rooms().await {
            if let Some(summary) = overview(&room).await {
                overviews.push(summary);
            }
        }
        overviews
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, room_id: String) -> Result<RoomOverview, GetRoomDetailError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomDetailError::InvalidRoomId)?;
        let room = self
            .registry
            .get(&room_id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)?;
        overview(&room)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}
