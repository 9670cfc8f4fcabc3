use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::auth;
use crate::error::ApiError;
use crate::models::Requester;

/// Identity extracted from a validated bearer access token. Handlers take
/// this as an argument; routes without it stay public.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl AuthUser {
    pub fn requester(&self) -> Requester {
        Requester {
            user_id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(unauthorized)?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(unauthorized)?;

        let claims = auth::decode_token(token, &state.config.jwt)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token.".to_string()))?;

        // Refresh tokens are not valid for API access.
        if claims.typ != auth::TOKEN_TYPE_ACCESS {
            return Err(ApiError::Unauthorized("Invalid or expired token.".to_string()));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.is_admin,
        })
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Authentication credentials were not provided.".to_string())
}
