use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::error::{ApiError, ValidJson};
use crate::middleware::AuthUser;
use crate::models::Seat;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats/", get(list_seats))
        .route("/seats/reserve/", post(reserve_seat))
        .route("/seats/{seat_number}/cancel/", delete(cancel_reservation))
        .route("/seats/reset/", post(reset_seats))
}

/// Seat as exposed on the wire. Reservation ownership stays internal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatResponse {
    pub seat_number: i64,
    pub is_reserved: bool,
}

impl From<Seat> for SeatResponse {
    fn from(seat: Seat) -> Self {
        SeatResponse {
            seat_number: seat.seat_number,
            is_reserved: seat.is_reserved,
        }
    }
}

// GET /api/seats/
async fn list_seats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let seats = state.engine.list_seats().await?;
    let payload: Vec<SeatResponse> = seats.into_iter().map(SeatResponse::from).collect();
    Ok((StatusCode::OK, Json(payload)))
}

// POST /api/seats/reserve/
#[derive(Debug, Deserialize)]
struct ReserveRequest {
    #[serde(rename = "seatNumber")]
    seat_number: i64,
}

async fn reserve_seat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidJson(req): ValidJson<ReserveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let seat = state.engine.reserve(req.seat_number, user.requester()).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Seat {} reserved successfully.", seat.seat_number)
        })),
    ))
}

// DELETE /api/seats/{seat_number}/cancel/
async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(seat_number): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let seat = state.engine.cancel(seat_number, user.requester()).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Reservation for seat {} cancelled.", seat.seat_number)
        })),
    ))
}

// POST /api/seats/reset/
async fn reset_seats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.engine.reset(user.requester()).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Successfully reset {count} seats."),
            "count": count
        })),
    ))
}
