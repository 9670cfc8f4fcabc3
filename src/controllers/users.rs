use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth;
use crate::controllers::seats::SeatResponse;
use crate::error::{ApiError, ValidJson};
use crate::middleware::AuthUser;
use crate::store::StoreError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/signup/", post(signup))
        .route("/users/login/", post(login))
        .route("/users/me/reservations/", get(my_reservations))
}

const MAX_USERNAME_LEN: usize = 150;
const MIN_PASSWORD_LEN: usize = 8;

/* ---------- SIGNUP / LOGIN ---------- */

#[derive(Debug, Deserialize)]
struct CredentialsRequest {
    username: Option<String>,
    password: Option<String>,
}

// POST /api/users/signup/
async fn signup(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::Validation(
            "Username must be between 1 and 150 characters.".to_string(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters.".to_string(),
        ));
    }

    let hash = auth::hash_password(&password).map_err(|e| {
        tracing::error!("password hashing failed: {e:?}");
        ApiError::Internal("Temporary server error. Please try again.".to_string())
    })?;

    let user = state
        .users
        .create(&username, &hash, false)
        .await
        .map_err(|e| match e {
            StoreError::AlreadyExists => {
                ApiError::Validation("This username is already taken.".to_string())
            }
            e => {
                tracing::error!("signup store error: {e:?}");
                ApiError::Internal("Temporary server error. Please try again.".to_string())
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "username": user.username })),
    ))
}

// POST /api/users/login/
async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(ApiError::Validation(
            "Username and password are required.".to_string(),
        ));
    };
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required.".to_string(),
        ));
    }

    let user = state
        .users
        .find_by_username(&username)
        .await
        .map_err(|e| {
            tracing::error!("login store error: {e:?}");
            ApiError::Internal("Temporary server error. Please try again.".to_string())
        })?
        .filter(|u| auth::verify_password(&password, &u.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials.".to_string()))?;

    let tokens = auth::issue_token_pair(&user, &state.config.jwt).map_err(|e| {
        tracing::error!("token issuing failed: {e:?}");
        ApiError::Internal("Temporary server error. Please try again.".to_string())
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Login successful",
            "access": tokens.access,
            "refresh": tokens.refresh
        })),
    ))
}

/* ---------- RESERVATIONS ---------- */

// GET /api/users/me/reservations/
async fn my_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let seats = state.engine.my_reservations(user.requester()).await?;
    let payload: Vec<SeatResponse> = seats.into_iter().map(SeatResponse::from).collect();
    Ok((StatusCode::OK, Json(payload)))
}
