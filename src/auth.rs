//! Token issuing/validation and password hashing. The rest of the system
//! only ever sees a resolved `Requester`; everything JWT-shaped stays here.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::models::UserRecord;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub is_admin: bool,
    pub typ: String,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn issue_token_pair(
    user: &UserRecord,
    config: &JwtConfig,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let key = EncodingKey::from_secret(config.secret.as_bytes());

    let access = encode(
        &Header::default(),
        &Claims {
            sub: user.user_id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            typ: TOKEN_TYPE_ACCESS.to_string(),
            exp: (now + Duration::minutes(config.access_ttl_minutes)).timestamp(),
        },
        &key,
    )?;
    let refresh = encode(
        &Header::default(),
        &Claims {
            sub: user.user_id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            typ: TOKEN_TYPE_REFRESH.to_string(),
            exp: (now + Duration::days(config.refresh_ttl_days)).timestamp(),
        },
        &key,
    )?;

    Ok(TokenPair { access, refresh })
}

pub fn decode_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
