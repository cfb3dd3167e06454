//! Codesync collaborative editing server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin codesync-server
//! cargo run --bin codesync-server -- --host 127.0.0.1 --port 3000 --database-url sqlite://codesync.db?mode=rwc
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use codesync_server::{
    config::SessionConfig,
    domain::SnapshotRepository,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemorySnapshotRepository, SqliteSnapshotRepository},
    },
    ui::Server,
    usecase::{
        ConnectionDirectory, EditCodeUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, RoomPersister, RoomRegistry, ShutdownFlushUseCase,
        SyncCodeUseCase,
    },
};
use codesync_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "codesync-server")]
#[command(about = "Room session manager for a collaborative code editor", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "3000")]
    port: u16,

    /// SQLite database URL for room snapshots (in-memory store when omitted)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Seconds between periodic saves of each active room
    #[arg(long, env = "SAVE_INTERVAL_SECS", default_value = "300", value_parser = clap::value_parser!(u64).range(1..))]
    save_interval_secs: u64,

    /// Seconds before a persistence store call is treated as failed
    #[arg(long, env = "STORE_TIMEOUT_SECS", default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    store_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. Registry / Directory
    // 4. UseCases
    // 5. Server

    // 1. Create Repository
    let repository: Arc<dyn SnapshotRepository> = match &args.database_url {
        Some(url) => match SqliteSnapshotRepository::connect(url).await {
            Ok(repository) => {
                tracing::info!("Using SQLite snapshot store at {}", url);
                Arc::new(repository)
            }
            Err(e) => {
                tracing::error!("Failed to open snapshot store: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No DATABASE_URL given, room contents are kept in memory only");
            Arc::new(InMemorySnapshotRepository::new())
        }
    };

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create Registry and ConnectionDirectory
    let config = SessionConfig {
        save_interval: Duration::from_secs(args.save_interval_secs),
        store_timeout: Duration::from_secs(args.store_timeout_secs),
    };
    let clock = Arc::new(SystemClock);
    let persister = Arc::new(RoomPersister::new(repository, clock.clone(), config));
    let registry = Arc::new(RoomRegistry::new(persister, clock.clone()));
    let directory = Arc::new(ConnectionDirectory::new());

    // 4. Create UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        directory.clone(),
        message_pusher.clone(),
        clock,
    ));
    let edit_code_usecase = Arc::new(EditCodeUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let sync_code_usecase = Arc::new(SyncCodeUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        registry.clone(),
        directory,
        message_pusher.clone(),
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(registry.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(registry.clone()));
    let shutdown_flush_usecase = Arc::new(ShutdownFlushUseCase::new(registry));

    // 5. Create and run the server
    let server = Server::new(
        join_room_usecase,
        edit_code_usecase,
        sync_code_usecase,
        leave_room_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
        shutdown_flush_usecase,
        message_pusher,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
