//! UseCase テスト用の共通部品

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use codesync_shared::time::FixedClock;

use crate::{
    config::SessionConfig,
    domain::{
        ConnectionId, DisplayName, MessagePushError, MessagePusher, PusherChannel,
        RepositoryError, RoomEvent, RoomId, RoomSnapshot, SnapshotRepository, Timestamp,
    },
    infrastructure::repository::InMemorySnapshotRepository,
};

use super::{
    ConnectionDirectory, EditCodeUseCase, JoinRoomUseCase, LeaveRoomUseCase, RoomPersister,
    RoomRegistry, ShutdownFlushUseCase, SyncCodeUseCase,
};

pub const NOW: i64 = 1_700_000_000_000;

pub fn room_id(value: &str) -> RoomId {
    RoomId::new(value.to_string()).unwrap()
}

pub fn connection(value: &str) -> ConnectionId {
    ConnectionId::new(value.to_string()).unwrap()
}

pub fn name(value: &str) -> DisplayName {
    DisplayName::new(value.to_string())
}

/// 送信した通知を記録する MessagePusher
#[derive(Default)]
pub struct RecordingMessagePusher {
    sent: Mutex<Vec<(ConnectionId, RoomEvent)>>,
    unregistered: Mutex<Vec<ConnectionId>>,
}

impl RecordingMessagePusher {
    /// 指定した接続に届いた通知（送信順）
    pub fn sent_to(&self, connection_id: &ConnectionId) -> Vec<RoomEvent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| target == connection_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn total_sent(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn was_unregistered(&self, connection_id: &ConnectionId) -> bool {
        self.unregistered.lock().unwrap().contains(connection_id)
    }
}

#[async_trait]
impl MessagePusher for RecordingMessagePusher {
    async fn register_client(&self, _connection_id: ConnectionId, _sender: PusherChannel) {}

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        self.unregistered.lock().unwrap().push(connection_id.clone());
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        self.sent
            .lock()
            .unwrap()
            .push((connection_id.clone(), event.clone()));
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let mut sent = self.sent.lock().unwrap();
        for target in targets {
            sent.push((target, event.clone()));
        }
        Ok(())
    }
}

/// 応答を遅延させ、呼び出し回数を数える SnapshotRepository
pub struct SlowRepository {
    delay: Duration,
    inner: InMemorySnapshotRepository,
    finds: AtomicUsize,
    upserts: AtomicUsize,
}

impl SlowRepository {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemorySnapshotRepository::new(),
            finds: AtomicUsize::new(0),
            upserts: AtomicUsize::new(0),
        }
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotRepository for SlowRepository {
    async fn find_by_room(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, RepositoryError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.find_by_room(room_id).await
    }

    async fn upsert(
        &self,
        room_id: &RoomId,
        content: &str,
        timestamp: Timestamp,
    ) -> Result<(), RepositoryError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.upsert(room_id, content, timestamp).await
    }
}

pub fn create_registry(
    repository: Arc<dyn SnapshotRepository>,
    config: SessionConfig,
) -> Arc<RoomRegistry> {
    let clock = Arc::new(FixedClock::new(NOW));
    let persister = Arc::new(RoomPersister::new(repository, clock.clone(), config));
    Arc::new(RoomRegistry::new(persister, clock))
}

/// 全ユースケースを同じ Registry / Directory / Pusher で組み立てたもの
pub struct TestContext {
    pub registry: Arc<RoomRegistry>,
    pub directory: Arc<ConnectionDirectory>,
    pub pusher: Arc<RecordingMessagePusher>,
    pub join: JoinRoomUseCase,
    pub edit: EditCodeUseCase,
    pub sync: SyncCodeUseCase,
    pub leave: LeaveRoomUseCase,
    pub shutdown: ShutdownFlushUseCase,
}

impl TestContext {
    /// インメモリストアで組み立て、ストアも返す
    pub fn in_memory() -> (Self, Arc<InMemorySnapshotRepository>) {
        let store = Arc::new(InMemorySnapshotRepository::new());
        (Self::with_repository(store.clone()), store)
    }

    pub fn with_repository(repository: Arc<dyn SnapshotRepository>) -> Self {
        let registry = create_registry(repository, SessionConfig::default());
        let directory = Arc::new(ConnectionDirectory::new());
        let pusher = Arc::new(RecordingMessagePusher::default());
        let clock = Arc::new(FixedClock::new(NOW));

        Self {
            join: JoinRoomUseCase::new(
                registry.clone(),
                directory.clone(),
                pusher.clone(),
                clock,
            ),
            edit: EditCodeUseCase::new(registry.clone(), pusher.clone()),
            sync: SyncCodeUseCase::new(registry.clone(), pusher.clone()),
            leave: LeaveRoomUseCase::new(registry.clone(), directory.clone(), pusher.clone()),
            shutdown: ShutdownFlushUseCase::new(registry.clone()),
            registry,
            directory,
            pusher,
        }
    }
}
