//! Server state shared by every handler.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    domain::MessagePusher,
    usecase::{
        EditCodeUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, SyncCodeUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（入室のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// EditCodeUseCase（編集のユースケース）
    pub edit_code_usecase: Arc<EditCodeUseCase>,
    /// SyncCodeUseCase（同期要求のユースケース）
    pub sync_code_usecase: Arc<SyncCodeUseCase>,
    /// LeaveRoomUseCase（退室のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// MessagePusher（メッセージ通知の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// Becomes `true` once the shutdown flush has finished
    pub shutdown: watch::Receiver<bool>,
}
