//! エンティティ定義

use super::value_object::{ConnectionId, DisplayName, RoomId, Timestamp};

/// ルーム内の参加者（1 本の接続のメンバーシップ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: DisplayName,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(connection_id: ConnectionId, display_name: DisplayName, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            display_name,
            joined_at,
        }
    }
}

/// 永続化ストアに保存されたルームの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub content: String,
    pub last_updated: Timestamp,
}
