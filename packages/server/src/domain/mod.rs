//! ドメイン層
//!
//! ルーム・参加者・共有ドキュメントといったビジネス上の概念と、
//! 外部コラボレーター（永続化ストア、送信路）へのインターフェースを定義します。

pub mod document;
pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod repository;
pub mod room;
pub mod value_object;

pub use document::CodeDocument;
pub use entity::{Participant, RoomSnapshot};
pub use error::{DocumentError, MessagePushError, RepositoryError, ValueObjectError};
pub use event::RoomEvent;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::SnapshotRepository;
pub use room::Room;
pub use value_object::{ConnectionId, DisplayName, RoomId, Timestamp};
