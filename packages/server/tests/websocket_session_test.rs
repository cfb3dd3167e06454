//! Integration tests driving a real server over WebSocket and HTTP.

use std::{sync::Arc, time::Duration};

use codesync_server::{
    config::SessionConfig,
    domain::{RoomId, SnapshotRepository, Timestamp},
    infrastructure::{
        dto::websocket::ServerMessage, message_pusher::WebSocketMessagePusher,
        repository::InMemorySnapshotRepository,
    },
    ui::Server,
    usecase::{
        ConnectionDirectory, EditCodeUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, RoomPersister, RoomRegistry, ShutdownFlushUseCase,
        SyncCodeUseCase,
    },
};
use codesync_shared::time::SystemClock;
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Server running in-process on an ephemeral port
struct TestServer {
    addr: std::net::SocketAddr,
    store: Arc<InMemorySnapshotRepository>,
    registry: Arc<RoomRegistry>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let store = Arc::new(InMemorySnapshotRepository::new());
        let clock = Arc::new(SystemClock);
        let persister = Arc::new(RoomPersister::new(
            store.clone(),
            clock.clone(),
            SessionConfig::default(),
        ));
        let registry = Arc::new(RoomRegistry::new(persister, clock.clone()));
        let directory = Arc::new(ConnectionDirectory::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());

        let server = Server::new(
            Arc::new(JoinRoomUseCase::new(
                registry.clone(),
                directory.clone(),
                pusher.clone(),
                clock,
            )),
            Arc::new(EditCodeUseCase::new(registry.clone(), pusher.clone())),
            Arc::new(SyncCodeUseCase::new(registry.clone(), pusher.clone())),
            Arc::new(LeaveRoomUseCase::new(
                registry.clone(),
                directory,
                pusher.clone(),
            )),
            Arc::new(GetRoomsUseCase::new(registry.clone())),
            Arc::new(GetRoomDetailUseCase::new(registry.clone())),
            Arc::new(ShutdownFlushUseCase::new(registry.clone())),
            pusher,
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            store,
            registry,
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self) -> Client {
        let (client, _) = connect_async(self.ws_url()).await.unwrap();
        client
    }

    async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("server did not stop")
            .unwrap();
    }

    async fn room_text(&self, room: &str) -> Option<String> {
        let room = self.registry.get(&room_id(room)).await?;
        let text = room.lock().await.text();
        Some(text)
    }

    async fn stored_text(&self, room: &str) -> Option<String> {
        self.store
            .find_by_room(&room_id(room))
            .await
            .unwrap()
            .map(|snapshot| snapshot.content)
    }
}

fn room_id(value: &str) -> RoomId {
    RoomId::new(value.to_string()).unwrap()
}

async fn send_json(client: &mut Client, value: serde_json::Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

async fn join(client: &mut Client, room: &str, name: &str) {
    send_json(
        client,
        serde_json::json!({"type": "join", "roomId": room, "displayName": name}),
    )
    .await;
}

async fn edit(client: &mut Client, room: &str, text: &str) {
    send_json(
        client,
        serde_json::json!({"type": "edit", "roomId": room, "fullText": text}),
    )
    .await;
}

/// Next server frame, skipping control frames
async fn recv(client: &mut Client) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn recv_code(client: &mut Client) -> String {
    match recv(client).await {
        ServerMessage::CodeUpdate(msg) => msg.full_text,
        other => panic!("expected code-update, got {:?}", other),
    }
}

async fn recv_roster(client: &mut Client) -> Vec<String> {
    match recv(client).await {
        ServerMessage::Joined(msg) => msg.roster.into_iter().map(|e| e.display_name).collect(),
        other => panic!("expected joined, got {:?}", other),
    }
}

/// Poll until `check` holds or fail after a few seconds
async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_two_clients_edit_and_persist_on_last_leave() {
    // テスト項目: 2 人の編集が互いに届き、全員の切断後に内容が保存されてルームが消える
    // given (前提条件):
    let server = TestServer::start().await;
    let srv = &server;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作): alice が入室して編集
    join(&mut alice, "R1", "alice").await;

    // then (期待する結果): 自分だけの一覧と空のテキストが届く
    assert_eq!(recv_roster(&mut alice).await, vec!["alice"]);
    assert_eq!(recv_code(&mut alice).await, "");

    edit(&mut alice, "R1", "hello").await;
    eventually(move || async move { srv.room_text("R1").await.as_deref() == Some("hello") }).await;

    // when (操作): bob が入室
    join(&mut bob, "R1", "bob").await;

    // then (期待する結果): 両者に 2 人分の一覧、bob には現在のテキスト
    assert_eq!(recv_roster(&mut bob).await, vec!["alice", "bob"]);
    assert_eq!(recv_code(&mut bob).await, "hello");
    assert_eq!(recv_roster(&mut alice).await, vec!["alice", "bob"]);

    // when (操作): bob が編集
    edit(&mut bob, "R1", "hello world").await;

    // then (期待する結果): alice に届く
    assert_eq!(recv_code(&mut alice).await, "hello world");

    // when (操作): bob が切断
    bob.close(None).await.unwrap();

    // then (期待する結果): alice に退室が通知される
    match recv(&mut alice).await {
        ServerMessage::MemberLeft(msg) => assert_eq!(msg.display_name, "bob"),
        other => panic!("expected member-left, got {:?}", other),
    }

    // when (操作): alice も切断
    alice.close(None).await.unwrap();

    // then (期待する結果): 保存されてからルームが消える
    eventually(move || async move { !srv.registry.contains(&room_id("R1")).await }).await;
    assert_eq!(server.stored_text("R1").await.as_deref(), Some("hello world"));

    server.stop().await;
}

#[tokio::test]
async fn test_rejoin_after_retire_restores_saved_text() {
    // テスト項目: 全員が抜けた後に入室すると保存された内容から再開する
    // given (前提条件):
    let server = TestServer::start().await;
    let srv = &server;
    server
        .store
        .upsert(&room_id("R2"), "draft", Timestamp::new(0))
        .await
        .unwrap();
    let mut first = server.connect().await;
    join(&mut first, "R2", "first").await;
    recv_roster(&mut first).await;
    assert_eq!(recv_code(&mut first).await, "draft");
    edit(&mut first, "R2", "final").await;
    eventually(move || async move { srv.room_text("R2").await.as_deref() == Some("final") }).await;
    first.close(None).await.unwrap();
    eventually(move || async move { !srv.registry.contains(&room_id("R2")).await }).await;

    // when (操作):
    let mut second = server.connect().await;
    join(&mut second, "R2", "second").await;

    // then (期待する結果):
    assert_eq!(recv_roster(&mut second).await, vec!["second"]);
    assert_eq!(recv_code(&mut second).await, "final");

    server.stop().await;
}

#[tokio::test]
async fn test_bad_frames_are_ignored() {
    // テスト項目: 不正なフレームや存在しないルームへの編集では何も返らず、接続も切れない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    // when (操作):
    client
        .send(Message::Text("not json".to_string().into()))
        .await
        .unwrap();
    edit(&mut client, "ghost", "boo").await;
    join(&mut client, "", "nobody").await;
    join(&mut client, "R3", "carol").await;

    // then (期待する結果): 最初に届くのは正しい入室への応答
    assert_eq!(recv_roster(&mut client).await, vec!["carol"]);
    assert_eq!(recv_code(&mut client).await, "");
    assert!(!server.registry.contains(&room_id("ghost")).await);

    server.stop().await;
}

#[tokio::test]
async fn test_request_sync_echoes_text() {
    // テスト項目: 同期要求は送った全文がそのまま返ってくる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut client = server.connect().await;
    join(&mut client, "R4", "dave").await;
    recv_roster(&mut client).await;
    recv_code(&mut client).await;

    // when (操作):
    send_json(
        &mut client,
        serde_json::json!({"type": "request-sync", "roomId": "R4", "fullText": "mine"}),
    )
    .await;

    // then (期待する結果):
    assert_eq!(recv_code(&mut client).await, "mine");

    server.stop().await;
}

#[tokio::test]
async fn test_http_api_lists_rooms() {
    // テスト項目: HTTP API でヘルスチェックとルーム一覧・詳細が取得できる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut client = server.connect().await;
    join(&mut client, "R5", "erin").await;
    recv_roster(&mut client).await;
    recv_code(&mut client).await;
    let http = reqwest::Client::new();

    // when (操作):
    let health: serde_json::Value = http
        .get(server.http_url("/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rooms: serde_json::Value = http
        .get(server.http_url("/api/rooms"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail: serde_json::Value = http
        .get(server.http_url("/api/rooms/R5"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing = http
        .get(server.http_url("/api/rooms/nope"))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health["status"], "ok");
    assert_eq!(rooms[0]["id"], "R5");
    assert_eq!(rooms[0]["participants"][0], "erin");
    assert_eq!(detail["participants"][0]["displayName"], "erin");
    assert!(detail["createdAt"].is_string());
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_flushes_active_rooms() {
    // テスト項目: 停止時に接続中のルームが保存され、接続が閉じられる
    // given (前提条件):
    let server = TestServer::start().await;
    let srv = &server;
    let mut client = server.connect().await;
    join(&mut client, "R6", "frank").await;
    recv_roster(&mut client).await;
    recv_code(&mut client).await;
    edit(&mut client, "R6", "unsaved work").await;
    eventually(move || async move { srv.room_text("R6").await.as_deref() == Some("unsaved work") }).await;
    let store = server.store.clone();

    // when (操作):
    server.stop().await;

    // then (期待する結果):
    let snapshot = store.find_by_room(&room_id("R6")).await.unwrap().unwrap();
    assert_eq!(snapshot.content, "unsaved work");
    let next = tokio::time::timeout(RECV_TIMEOUT, client.next()).await.unwrap();
    assert!(matches!(next, None | Some(Ok(Message::Close(_))) | Some(Err(_))));
}
