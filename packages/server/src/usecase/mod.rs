//! UseCase 層
//!
//! セッションコーディネーター（入室・編集・同期・退室）と、
//! ルームのライフサイクル（Registry、定期保存、シャットダウン時の保存）を実装します。

pub mod connection_directory;
pub mod edit_code;
pub mod error;
pub mod get_rooms;
pub mod join_room;
pub mod leave_room;
pub mod persistence;
pub mod room_registry;
pub mod shutdown_flush;
pub mod sync_code;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection_directory::{ConnectionDirectory, ConnectionEntry};
pub use edit_code::EditCodeUseCase;
pub use error::{EditCodeError, GetRoomDetailError, PersistError, SyncCodeError};
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase, RoomOverview};
pub use join_room::JoinRoomUseCase;
pub use leave_room::{LeaveOutcome, LeaveRoomUseCase, RoomDeparture};
pub use persistence::RoomPersister;
pub use room_registry::{ActiveRoom, PersistenceTimer, RoomRegistry};
pub use shutdown_flush::{FlushReport, ShutdownFlushUseCase};
pub use sync_code::SyncCodeUseCase;
