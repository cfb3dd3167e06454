//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{
    domain::MessagePusher,
    usecase::{
        EditCodeUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, ShutdownFlushUseCase, SyncCodeUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Collaborative editing server
///
/// This struct wires the use cases into an axum router and owns the shutdown
/// sequence: stop accepting, flush every active room, then close open sessions.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     join_room_usecase,
///     edit_code_usecase,
///     sync_code_usecase,
///     leave_room_usecase,
///     get_rooms_usecase,
///     get_room_detail_usecase,
///     shutdown_flush_usecase,
///     message_pusher,
/// );
/// server.run("0.0.0.0".to_string(), 3000).await?;
/// ```
pub struct Server {
    join_room_usecase: Arc<JoinRoomUseCase>,
    edit_code_usecase: Arc<EditCodeUseCase>,
    sync_code_usecase: Arc<SyncCodeUseCase>,
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// ShutdownFlushUseCase（終了時の一括保存）
    shutdown_flush_usecase: Arc<ShutdownFlushUseCase>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl Server {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        edit_code_usecase: Arc<EditCodeUseCase>,
        sync_code_usecase: Arc<SyncCodeUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        shutdown_flush_usecase: Arc<ShutdownFlushUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            join_room_usecase,
            edit_code_usecase,
            sync_code_usecase,
            leave_room_usecase,
            get_rooms_usecase,
            get_room_detail_usecase,
            shutdown_flush_usecase,
            message_pusher,
        }
    }

    /// Run the server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Codesync server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `signal` resolves
    ///
    /// When `signal` resolves, every active room is flushed once before open
    /// WebSocket sessions are told to close.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let app_state = Arc::new(AppState {
            join_room_usecase: self.join_room_usecase,
            edit_code_usecase: self.edit_code_usecase,
            sync_code_usecase: self.sync_code_usecase,
            leave_room_usecase: self.leave_room_usecase,
            get_rooms_usecase: self.get_rooms_usecase,
            get_room_detail_usecase: self.get_room_detail_usecase,
            message_pusher: self.message_pusher,
            shutdown: shutdown_rx,
        });

        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        let shutdown_flush_usecase = self.shutdown_flush_usecase;
        let graceful = async move {
            signal.await;
            let report = shutdown_flush_usecase.execute().await;
            if report.failed > 0 {
                tracing::warn!(
                    "{} of {} rooms could not be saved",
                    report.failed,
                    report.attempted
                );
            }
            // 保存が終わってから接続を閉じる
            let _ = shutdown_tx.send(true);
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
