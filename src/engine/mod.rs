//! Reservation engine: reserve/cancel/reset business rules over the seat
//! store. All seat mutation goes through the locked read-modify-write path;
//! every early return leaves the store untouched.

pub mod failure;
pub mod policy;

use std::sync::Arc;

use crate::models::{Requester, Seat};
use crate::store::{SeatStore, SeatTx, StoreError};

pub use failure::{FailurePolicy, NoFailure, RandomFailure};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("seat {0} does not exist")]
    NotFound(i64),
    #[error("seat {0} is already reserved")]
    AlreadyReserved(i64),
    #[error("seat {0} is not in a reserved state")]
    NotReserved(i64),
    #[error("requester may not modify seat {0}")]
    NotOwner(i64),
    #[error("admin privileges required")]
    AdminRequired,
    #[error("injected reservation failure")]
    Injected,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct ReservationEngine {
    store: Arc<dyn SeatStore>,
    failure: Arc<dyn FailurePolicy>,
}

impl ReservationEngine {
    pub fn new(store: Arc<dyn SeatStore>, failure: Arc<dyn FailurePolicy>) -> Self {
        ReservationEngine { store, failure }
    }

    /// Reserves a seat for the requester. The check order is a contract:
    /// not-found, then conflict, then the injected-failure draw, then the
    /// mutation. A duplicate attempt therefore always yields
    /// `AlreadyReserved`, never `Injected`.
    pub async fn reserve(
        &self,
        seat_number: i64,
        requester: Requester,
    ) -> Result<Seat, EngineError> {
        let mut tx = self.store.begin().await?;

        let Some(mut seat) = tx.get_for_update(seat_number).await? else {
            let _ = tx.rollback().await;
            return Err(EngineError::NotFound(seat_number));
        };

        if seat.is_reserved {
            let _ = tx.rollback().await;
            return Err(EngineError::AlreadyReserved(seat_number));
        }

        // Fresh draw on every attempt, after the conflict check and before
        // any mutation.
        if self.failure.should_fail() {
            let _ = tx.rollback().await;
            return Err(EngineError::Injected);
        }

        seat.is_reserved = true;
        seat.reserved_by = Some(requester.user_id);
        tx.save(&seat).await?;
        tx.commit().await?;

        tracing::debug!(seat = seat_number, user = requester.user_id, "seat reserved");
        Ok(seat)
    }

    /// Cancels a reservation. Reuses the locked fetch for uniformity with
    /// reserve. Check order: not-found, then ownership, then state.
    pub async fn cancel(
        &self,
        seat_number: i64,
        requester: Requester,
    ) -> Result<Seat, EngineError> {
        let mut tx = self.store.begin().await?;

        let Some(mut seat) = tx.get_for_update(seat_number).await? else {
            let _ = tx.rollback().await;
            return Err(EngineError::NotFound(seat_number));
        };

        if !policy::can_modify(&requester, &seat) {
            let _ = tx.rollback().await;
            return Err(EngineError::NotOwner(seat_number));
        }

        if !seat.is_reserved {
            let _ = tx.rollback().await;
            return Err(EngineError::NotReserved(seat_number));
        }

        seat.is_reserved = false;
        seat.reserved_by = None;
        tx.save(&seat).await?;
        tx.commit().await?;

        tracing::debug!(seat = seat_number, user = requester.user_id, "reservation cancelled");
        Ok(seat)
    }

    /// Frees every seat in one bulk update. Admin only.
    pub async fn reset(&self, requester: Requester) -> Result<u64, EngineError> {
        if !requester.is_admin {
            return Err(EngineError::AdminRequired);
        }
        let count = self.store.reset_all().await?;
        tracing::info!(count, user = requester.user_id, "all seats reset");
        Ok(count)
    }

    pub async fn list_seats(&self) -> Result<Vec<Seat>, EngineError> {
        Ok(self.store.list().await?)
    }

    pub async fn my_reservations(&self, requester: Requester) -> Result<Vec<Seat>, EngineError> {
        Ok(self.store.list_by_owner(requester.user_id).await?)
    }
}
