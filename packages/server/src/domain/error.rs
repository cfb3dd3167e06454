//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクト生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Room ID が空文字列
    #[error("Room ID must not be empty")]
    RoomIdEmpty,

    /// Connection ID が空文字列
    #[error("Connection ID must not be empty")]
    ConnectionIdEmpty,
}

/// 永続化ストアのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// ストアへの読み書きに失敗
    #[error("Storage error: {0}")]
    Storage(String),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先の接続が登録されていない
    #[error("Connection not found: {0}")]
    ClientNotFound(String),

    /// 送信チャンネルが閉じている
    #[error("Push failed: {0}")]
    PushFailed(String),
}

/// 共有ドキュメント操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Failed to decode update: {0}")]
    Decode(String),

    #[error("Failed to apply update: {0}")]
    Apply(String),
}
