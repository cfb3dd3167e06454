//! ルームから接続へ送る通知

use super::{
    entity::Participant,
    value_object::{ConnectionId, DisplayName},
};

/// セッションコーディネーターが送信路へ渡す通知
///
/// ワイヤー形式への変換は Infrastructure 層の DTO が担当する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// 新しい参加者が入室した（ルーム全員へ送る）
    Joined {
        roster: Vec<Participant>,
        new_participant: Participant,
    },
    /// ドキュメント全文
    CodeUpdate { full_text: String },
    /// 参加者が退室した（残りの参加者へ送る）
    MemberLeft {
        connection_id: ConnectionId,
        display_name: DisplayName,
    },
}
