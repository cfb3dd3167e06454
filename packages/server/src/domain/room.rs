//! Room 集約
//!
//! 1 つのルームの共有ドキュメントと参加者集合を保持します。
//! 排他制御は持たず、呼び出し側（`usecase::room_registry::ActiveRoom`）が
//! ルームごとの Mutex で直列化します。

use super::{
    document::CodeDocument,
    entity::Participant,
    value_object::{ConnectionId, RoomId, Timestamp},
};

/// ルームの状態
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    document: CodeDocument,
    /// 入室順
    participants: Vec<Participant>,
    /// 退役処理（最終保存と Registry からの削除）が完了したかどうか
    closed: bool,
}

impl Room {
    /// 新しいルームを作成
    ///
    /// `initial_content` は永続化ストアから読み込んだ前回の内容。
    pub fn new(id: RoomId, created_at: Timestamp, initial_content: Option<&str>) -> Self {
        let document = match initial_content {
            Some(content) => CodeDocument::with_content(content),
            None => CodeDocument::new(),
        };
        Self {
            id,
            created_at,
            document,
            participants: Vec::new(),
            closed: false,
        }
    }

    /// 参加者を登録（同じ接続 ID が既にあれば、入室順を保ったまま置き換える）
    pub fn add_participant(&mut self, participant: Participant) {
        match self
            .participants
            .iter_mut()
            .find(|p| p.connection_id == participant.connection_id)
        {
            Some(existing) => *existing = participant,
            None => self.participants.push(participant),
        }
    }

    /// 参加者を削除
    pub fn remove_participant(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| &p.connection_id == connection_id)?;
        Some(self.participants.remove(index))
    }

    /// 参加者一覧（入室順）
    pub fn roster(&self) -> Vec<Participant> {
        self.participants.clone()
    }

    /// 全参加者の接続 ID（入室順）
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.participants
            .iter()
            .map(|p| p.connection_id.clone())
            .collect()
    }

    /// 指定した接続以外の参加者の接続 ID
    pub fn connection_ids_except(&self, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.participants
            .iter()
            .filter(|p| &p.connection_id != exclude)
            .map(|p| p.connection_id.clone())
            .collect()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// 共有ドキュメントの全文
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// 共有ドキュメントを全文置き換え
    pub fn replace_text(&mut self, new_text: &str) {
        self.document.replace_text(new_text);
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
