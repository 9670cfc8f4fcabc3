use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::engine::EngineError;

/// API-level error taxonomy. The status-code mapping is a stable contract;
/// every failure response carries a short `error` message and nothing else.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(_) => {
                ApiError::NotFound("This seat does not exist.".to_string())
            }
            EngineError::AlreadyReserved(_) => {
                ApiError::Conflict("This seat is already reserved.".to_string())
            }
            EngineError::NotReserved(_) => {
                ApiError::Validation("This seat is not currently reserved.".to_string())
            }
            EngineError::NotOwner(_) => ApiError::Forbidden(
                "Only the reservation owner or an admin may cancel it.".to_string(),
            ),
            EngineError::AdminRequired => {
                ApiError::Forbidden("Admin privileges required.".to_string())
            }
            EngineError::Injected => ApiError::Internal(
                "Reservation failed due to a server error. Please try again.".to_string(),
            ),
            EngineError::Store(e) => {
                tracing::error!("store error: {e:?}");
                ApiError::Internal("Temporary server error. Please try again.".to_string())
            }
        }
    }
}

/// JSON extractor whose rejection is a 400 with an `error` body, so a
/// malformed request body maps to the documented status code instead of
/// axum's default 422.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}
