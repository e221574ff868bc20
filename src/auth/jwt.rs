use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
    #[serde(default)]
    pub jti: Option<Uuid>,
    /// Set on tokens minted by `/api/demo/start`; `sub` is then the shared
    /// sample identity.
    #[serde(default)]
    pub is_demo: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

fn sign(claims: &Claims, config: &Config) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
}

fn claims_for(
    user_id: Uuid,
    email: &str,
    ttl_secs: i64,
    token_type: TokenType,
) -> Claims {
    let now = Utc::now();
    Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
        token_type,
        jti: None,
        is_demo: false,
    }
}

pub fn create_access_token(user_id: Uuid, email: &str, config: &Config) -> AppResult<String> {
    let claims = claims_for(user_id, email, config.jwt_access_ttl_secs, TokenType::Access);
    sign(&claims, config)
}

/// Refresh tokens carry a `jti` so each one hashes to a distinct stored row.
pub fn create_refresh_token(user_id: Uuid, email: &str, config: &Config) -> AppResult<String> {
    let mut claims = claims_for(user_id, email, config.jwt_refresh_ttl_secs, TokenType::Refresh);
    claims.jti = Some(Uuid::new_v4());
    sign(&claims, config)
}

pub fn create_token_pair(user_id: Uuid, email: &str, config: &Config) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: create_access_token(user_id, email, config)?,
        refresh_token: create_refresh_token(user_id, email, config)?,
        expires_in: config.jwt_access_ttl_secs,
    })
}

/// Short-lived access token for the shared demo identity. Demo sessions get
/// no refresh token; they start over once this expires.
pub fn create_demo_access_token(config: &Config) -> AppResult<String> {
    let mut claims = claims_for(
        config.demo_user_id,
        "",
        config.demo_ttl_secs,
        TokenType::Access,
    );
    claims.is_demo = true;
    sign(&claims, config)
}

/// SHA-256 of a raw token, lowercase hex. Only this digest is persisted.
pub fn hash_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}
