//! In-memory seat store backed by a per-seat serialization mutex.
//!
//! Each seat owns a `tokio::sync::Mutex` that plays the role of the row
//! lock: `get_for_update` acquires it and the guard lives until the
//! transaction commits or rolls back. The committed value sits in a
//! separate `RwLock` cell so `list` stays a snapshot read that never
//! waits behind an in-flight reservation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{Seat, UserRecord};

use super::{SeatStore, SeatTx, StoreError, UserStore};

struct Slot {
    lock: Arc<Mutex<()>>,
    value: RwLock<Seat>,
}

impl Slot {
    fn new(seat: Seat) -> Self {
        Slot {
            lock: Arc::new(Mutex::new(())),
            value: RwLock::new(seat),
        }
    }

    fn read(&self) -> Result<Seat, StoreError> {
        self.value
            .read()
            .map(|s| s.clone())
            .map_err(|_| poisoned())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("seat slot poisoned".to_string())
}

#[derive(Clone)]
pub struct MemorySeatStore {
    slots: Arc<BTreeMap<i64, Arc<Slot>>>,
}

impl MemorySeatStore {
    /// Seeds seats 1..=seat_count, all free.
    pub fn new(seat_count: i64) -> Self {
        Self::with_seats((1..=seat_count).map(Seat::free))
    }

    pub fn with_seats(seats: impl IntoIterator<Item = Seat>) -> Self {
        let slots = seats
            .into_iter()
            .map(|s| (s.seat_number, Arc::new(Slot::new(s))))
            .collect();
        MemorySeatStore {
            slots: Arc::new(slots),
        }
    }
}

pub struct MemorySeatTx {
    slots: Arc<BTreeMap<i64, Arc<Slot>>>,
    held: Vec<(i64, OwnedMutexGuard<()>)>,
    staged: BTreeMap<i64, Seat>,
}

#[async_trait]
impl SeatTx for MemorySeatTx {
    async fn get_for_update(&mut self, seat_number: i64) -> Result<Option<Seat>, StoreError> {
        let Some(slot) = self.slots.get(&seat_number) else {
            return Ok(None);
        };
        // The mutex is not reentrant; only take it on first touch.
        if !self.held.iter().any(|(n, _)| *n == seat_number) {
            let guard = slot.lock.clone().lock_owned().await;
            self.held.push((seat_number, guard));
        }
        if let Some(staged) = self.staged.get(&seat_number) {
            return Ok(Some(staged.clone()));
        }
        slot.read().map(Some)
    }

    async fn save(&mut self, seat: &Seat) -> Result<(), StoreError> {
        self.staged.insert(seat.seat_number, seat.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        for (seat_number, seat) in &self.staged {
            if let Some(slot) = self.slots.get(seat_number) {
                let mut value = slot.value.write().map_err(|_| poisoned())?;
                *value = seat.clone();
            }
        }
        // Guards drop here, releasing the per-seat locks.
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        // Staged writes are simply discarded.
        Ok(())
    }
}

#[async_trait]
impl SeatStore for MemorySeatStore {
    async fn begin(&self) -> Result<Box<dyn SeatTx>, StoreError> {
        Ok(Box::new(MemorySeatTx {
            slots: self.slots.clone(),
            held: Vec::new(),
            staged: BTreeMap::new(),
        }))
    }

    async fn list(&self) -> Result<Vec<Seat>, StoreError> {
        self.slots.values().map(|slot| slot.read()).collect()
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Seat>, StoreError> {
        let mut seats = Vec::new();
        for slot in self.slots.values() {
            let seat = slot.read()?;
            if seat.reserved_by == Some(user_id) {
                seats.push(seat);
            }
        }
        Ok(seats)
    }

    async fn reset_all(&self) -> Result<u64, StoreError> {
        let mut count = 0u64;
        for slot in self.slots.values() {
            let mut value = slot.value.write().map_err(|_| poisoned())?;
            value.is_reserved = false;
            value.reserved_by = None;
            count += 1;
        }
        Ok(count)
    }
}

/* ---------- USERS ---------- */

pub struct MemoryUserStore {
    users: RwLock<BTreeMap<String, UserRecord>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        MemoryUserStore {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::Unavailable("user table poisoned".to_string()))?;
        if users.contains_key(username) {
            return Err(StoreError::AlreadyExists);
        }
        let user = UserRecord {
            user_id: self.next_id.fetch_add(1, Ordering::Relaxed),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
        };
        users.insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::Unavailable("user table poisoned".to_string()))?;
        Ok(users.get(username).cloned())
    }
}
