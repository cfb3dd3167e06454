//! Repository trait 定義
//!
//! ルーム内容の永続化ストアへのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{RepositoryError, RoomId, RoomSnapshot, Timestamp};

/// ルーム内容の永続化ストア
///
/// ルーム ID をキーに、最後に保存された全文と保存時刻を保持する。
/// 異なるルームへの並行 upsert に耐えること。同一ルームへの書き込みは
/// 呼び出し側がルーム単位で直列化する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// ルームの保存内容を取得（未保存なら `None`）
    async fn find_by_room(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, RepositoryError>;

    /// ルームの内容を保存（存在しなければ作成）
    async fn upsert(
        &self,
        room_id: &RoomId,
        content: &str,
        timestamp: Timestamp,
    ) -> Result<(), RepositoryError>;
}
