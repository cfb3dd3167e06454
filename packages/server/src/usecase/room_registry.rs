//! UseCase: アクティブなルームの管理
//!
//! ルーム ID から稼働中のルームを引く唯一の窓口です。
//!
//! - 同じ ID への同時の初回アクセスでも、ストアからの読み込みとルームの生成は 1 回だけ
//! - ルームの状態は `ActiveRoom` ごとの Mutex で直列化する
//! - ロックの取得順は常に「ルーム → Registry のマップ」
//! - シャットダウン中（draining）に作成されたルームには定期保存タイマーを付けない

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex as StdMutex,
        atomic::{AtomicBool, Ordering},
    },
};

use codesync_shared::time::Clock;
use tokio::{
    sync::{Mutex, MutexGuard, OnceCell},
    task::AbortHandle,
};

use crate::domain::{Room, RoomId, Timestamp};

use super::persistence::RoomPersister;

/// ルームの定期保存タイマーへのハンドル
#[derive(Default)]
pub struct PersistenceTimer {
    handle: StdMutex<Option<AbortHandle>>,
}

impl PersistenceTimer {
    pub fn arm(&self, handle: AbortHandle) {
        let previous = self
            .handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// タイマーを止める。2 回目以降の呼び出しは何もしない
    ///
    /// # Returns
    ///
    /// 稼働中のタイマーを止めた場合は `true`
    pub fn cancel(&self) -> bool {
        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        match handle {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Registry に登録されたルーム
pub struct ActiveRoom {
    id: RoomId,
    state: Mutex<Room>,
    timer: PersistenceTimer,
    /// シャットダウン中の最終保存を済ませたか
    final_save_claimed: AtomicBool,
}

impl ActiveRoom {
    fn new(room: Room) -> Self {
        Self {
            id: room.id.clone(),
            state: Mutex::new(room),
            timer: PersistenceTimer::default(),
            final_save_claimed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// ルームの状態をロック
    pub async fn lock(&self) -> MutexGuard<'_, Room> {
        self.state.lock().await
    }

    pub fn timer(&self) -> &PersistenceTimer {
        &self.timer
    }

    /// シャットダウン中の最終保存を担当する権利を取る
    ///
    /// # Returns
    ///
    /// 最初の呼び出しだけ `true`
    pub fn claim_final_save(&self) -> bool {
        !self.final_save_claimed.swap(true, Ordering::SeqCst)
    }
}

type RoomSlot = Arc<OnceCell<Arc<ActiveRoom>>>;

/// アクティブなルームの一覧
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, RoomSlot>>,
    persister: Arc<RoomPersister>,
    clock: Arc<dyn Clock>,
    /// シャットダウン中は退役処理を行わない
    draining: AtomicBool,
}

impl RoomRegistry {
    pub fn new(persister: Arc<RoomPersister>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            persister,
            clock,
            draining: AtomicBool::new(false),
        }
    }

    /// ルームを取得し、なければストアから読み込んで作成する
    ///
    /// 同じ ID への同時呼び出しは 1 回の読み込みを待ち合わせ、同じルームを受け取る。
    pub async fn get_or_create(&self, room_id: &RoomId) -> Arc<ActiveRoom> {
        let slot = {
            let mut rooms = self.rooms.lock().await;
            rooms
                .entry(room_id.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        slot.get_or_init(|| self.open_room(room_id)).await.clone()
    }

    async fn open_room(&self, room_id: &RoomId) -> Arc<ActiveRoom> {
        let content = self.persister.load(room_id).await;
        let created_at = Timestamp::new(self.clock.now_millis());
        let room = Arc::new(ActiveRoom::new(Room::new(
            room_id.clone(),
            created_at,
            content.as_deref(),
        )));

        if self.is_draining() {
            tracing::info!("Room '{}' activated during shutdown", room_id);
            return room;
        }

        let task = self.persister.spawn_periodic_flush(Arc::downgrade(&room));
        room.timer.arm(task.abort_handle());

        tracing::info!("Room '{}' activated", room_id);
        room
    }

    /// 作成済みのルームを取得（読み込み中・未作成なら None）
    pub async fn get(&self, room_id: &RoomId) -> Option<Arc<ActiveRoom>> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).and_then(|slot| slot.get().cloned())
    }

    /// ルームを登録解除し、定期保存タイマーを止める
    ///
    /// # Returns
    ///
    /// 登録されていた場合は `true`。存在しない ID は何もしない
    pub async fn remove(&self, room_id: &RoomId) -> bool {
        let removed = self.rooms.lock().await.remove(room_id);
        match removed {
            Some(slot) => {
                if let Some(room) = slot.get() {
                    room.timer.cancel();
                }
                tracing::info!("Room '{}' removed from registry", room_id);
                true
            }
            None => false,
        }
    }

    /// 作成済みの全ルーム（ID 順）
    pub async fn active_rooms(&self) -> Vec<Arc<ActiveRoom>> {
        let rooms = self.rooms.lock().await;
        let mut active: Vec<Arc<ActiveRoom>> =
            rooms.values().filter_map(|slot| slot.get().cloned()).collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        active
    }

    /// 全ルーム（ID 順）。読み込み中のルームは作成完了まで待つ
    ///
    /// マップのロックは待機前に手放す。
    pub async fn settled_rooms(&self) -> Vec<Arc<ActiveRoom>> {
        let slots: Vec<(RoomId, RoomSlot)> = {
            let rooms = self.rooms.lock().await;
            rooms
                .iter()
                .map(|(room_id, slot)| (room_id.clone(), slot.clone()))
                .collect()
        };

        let mut settled = Vec::with_capacity(slots.len());
        for (room_id, slot) in slots {
            let room = slot.get_or_init(|| self.open_room(&room_id)).await;
            settled.push(room.clone());
        }
        settled.sort_by(|a, b| a.id.cmp(&b.id));
        settled
    }

    pub async fn len(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, room_id: &RoomId) -> bool {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).is_some_and(|slot| slot.initialized())
    }

    /// シャットダウンを開始（以降、空になったルームは退役させない）
    pub fn begin_draining(&self) {
        self.draining.store(true, Ordering::SeqCst);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    pub fn persister(&self) -> &Arc<RoomPersister> {
        &self.persister
    }
}
