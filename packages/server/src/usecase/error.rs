//! UseCase 層のエラー定義

use std::time::Duration;

use thiserror::Error;

use crate::domain::RepositoryError;

/// 永続化の失敗（ログに残すだけで、クライアントには伝えない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Persistence store did not respond within {0:?}")]
    Timeout(Duration),
}

/// 編集の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditCodeError {
    /// ルームが存在しない（破棄済みのルームへの古いクライアントからの編集）
    #[error("Room not found: {0}")]
    RoomNotFound(String),
}

/// 同期要求の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncCodeError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Failed to push code to requester: {0}")]
    PushFailed(String),
}

/// ルーム詳細取得の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Invalid room id")]
    InvalidRoomId,

    #[error("Room not found")]
    RoomNotFound,
}
