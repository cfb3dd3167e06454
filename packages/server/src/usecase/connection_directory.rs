//! 接続ごとの表示名と参加中ルームの対応表
//!
//! 切断時、ルームのメンバーシップを片付ける前に「誰が抜けたか」を引くために使います。
//! エントリはキーごとに独立しているので、ルームのロックとは別の並行マップで保持します。

use dashmap::DashMap;

use crate::domain::{ConnectionId, DisplayName, RoomId};

/// 1 本の接続についての記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub display_name: DisplayName,
    /// 参加したルーム（参加順、重複なし）
    pub rooms: Vec<RoomId>,
}

#[derive(Default)]
pub struct ConnectionDirectory {
    entries: DashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入室を記録（表示名は最新の入室のものに更新する）
    pub fn record_join(&self, connection_id: &ConnectionId, display_name: DisplayName, room_id: &RoomId) {
        let mut entry = self
            .entries
            .entry(connection_id.clone())
            .or_insert_with(|| ConnectionEntry {
                display_name: display_name.clone(),
                rooms: Vec::new(),
            });
        entry.display_name = display_name;
        if !entry.rooms.contains(room_id) {
            entry.rooms.push(room_id.clone());
        }
    }

    pub fn display_name(&self, connection_id: &ConnectionId) -> Option<DisplayName> {
        self.entries
            .get(connection_id)
            .map(|entry| entry.display_name.clone())
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<ConnectionEntry> {
        self.entries.get(connection_id).map(|entry| entry.clone())
    }

    pub fn remove(&self, connection_id: &ConnectionId) -> Option<ConnectionEntry> {
        self.entries.remove(connection_id).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
