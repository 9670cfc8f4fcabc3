pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{Seat, UserRecord};

pub use memory::{MemorySeatStore, MemoryUserStore};
pub use postgres::{PgSeatStore, PgUserStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record already exists")]
    AlreadyExists,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// One all-or-nothing unit of work against the seat table. Dropping the
/// transaction without calling `commit` is equivalent to `rollback`.
#[async_trait]
pub trait SeatTx: Send {
    /// Fetches a seat and holds an exclusive lock on it until this
    /// transaction commits or rolls back. Concurrent `get_for_update`
    /// calls for the same seat number block until the holder finishes,
    /// which serializes all reservation attempts on that seat.
    async fn get_for_update(&mut self, seat_number: i64) -> Result<Option<Seat>, StoreError>;

    /// Stages the seat's mutable fields for write inside this transaction.
    async fn save(&mut self, seat: &Seat) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SeatStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn SeatTx>, StoreError>;

    /// Snapshot of all seats, ascending by seat number. Takes no row locks.
    async fn list(&self) -> Result<Vec<Seat>, StoreError>;

    /// Seats currently reserved by the given user, ascending by seat number.
    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Seat>, StoreError>;

    /// Bulk update freeing every seat. Returns the affected count.
    /// Last-writer-wins against in-flight reservations.
    async fn reset_all(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user. Returns `AlreadyExists` when the username is taken.
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<UserRecord, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
}
