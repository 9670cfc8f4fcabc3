use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::{Seat, UserRecord};

use super::{SeatStore, SeatTx, StoreError, UserStore};

/* ---------- SEATS ---------- */

#[derive(Clone)]
pub struct PgSeatStore {
    pool: PgPool,
}

impl PgSeatStore {
    pub fn new(pool: PgPool) -> Self {
        PgSeatStore { pool }
    }
}

pub struct PgSeatTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SeatTx for PgSeatTx {
    async fn get_for_update(&mut self, seat_number: i64) -> Result<Option<Seat>, StoreError> {
        let seat = sqlx::query_as::<_, Seat>(
            "SELECT seat_number, is_reserved, reserved_by
             FROM seats
             WHERE seat_number = $1
             FOR UPDATE",
        )
        .bind(seat_number)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(seat)
    }

    async fn save(&mut self, seat: &Seat) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE seats SET is_reserved = $2, reserved_by = $3 WHERE seat_number = $1",
        )
        .bind(seat.seat_number)
        .bind(seat.is_reserved)
        .bind(seat.reserved_by)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl SeatStore for PgSeatStore {
    async fn begin(&self) -> Result<Box<dyn SeatTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSeatTx { tx }))
    }

    async fn list(&self) -> Result<Vec<Seat>, StoreError> {
        let seats = sqlx::query_as::<_, Seat>(
            "SELECT seat_number, is_reserved, reserved_by
             FROM seats
             ORDER BY seat_number",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(seats)
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Seat>, StoreError> {
        let seats = sqlx::query_as::<_, Seat>(
            "SELECT seat_number, is_reserved, reserved_by
             FROM seats
             WHERE reserved_by = $1
             ORDER BY seat_number",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(seats)
    }

    async fn reset_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE seats SET is_reserved = FALSE, reserved_by = NULL")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/* ---------- USERS ---------- */

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        PgUserStore { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<UserRecord, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, password_hash, is_admin)
             VALUES ($1, $2, $3)
             RETURNING user_id, username, password_hash, is_admin",
        )
        .bind(username)
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::AlreadyExists,
            _ => StoreError::Database(e),
        })?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, username, password_hash, is_admin
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
