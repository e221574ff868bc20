use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::{create_token_pair, hash_token, verify_token, TokenPair, TokenType},
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::config::Config;
use crate::db::profiles::insert_profile;
use crate::error::{AppError, AppResult};
use crate::models::user::{
    ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, User,
};
use crate::AppState;

async fn store_refresh_token(
    db: &PgPool,
    user_id: Uuid,
    raw_refresh_token: &str,
    ttl_secs: i64,
    parent_token_id: Option<Uuid>,
) -> AppResult<Uuid> {
    let token_hash = hash_token(raw_refresh_token);
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, parent_token_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&token_hash)
    .bind(expires_at)
    .bind(parent_token_id)
    .execute(db)
    .await?;

    Ok(id)
}

/// Create a token pair AND persist the refresh token hash in the DB.
async fn issue_token_pair(
    db: &PgPool,
    user_id: Uuid,
    email: &str,
    config: &Config,
    parent_token_id: Option<Uuid>,
) -> AppResult<TokenPair> {
    let tokens = create_token_pair(user_id, email, config)?;
    store_refresh_token(
        db,
        user_id,
        &tokens.refresh_token,
        config.jwt_refresh_ttl_secs,
        parent_token_id,
    )
    .await?;
    Ok(tokens)
}

async fn revoke_all_user_tokens(db: &PgPool, user_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = true, revoked_at = NOW()
        WHERE user_id = $1 AND revoked = false
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

/// Marks a live refresh token as used. Returns false when it was already
/// revoked, including by a concurrent request.
async fn claim_refresh_token(db: &PgPool, token_id: Uuid) -> AppResult<bool> {
    let result = sqlx::query(ROTATE_REFRESH_TOKEN_SQL)
        .bind(token_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() == 1)
}

const ROTATE_REFRESH_TOKEN_SQL: &str = r#"
    UPDATE refresh_tokens
    SET revoked = true, revoked_at = NOW()
    WHERE id = $1 AND revoked = false
"#;

const EMAIL_TAKEN_MESSAGE: &str = "Email already registered";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<TokenPair>> {
    body.validate()?;
    let email = normalize_email(&body.email);

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&state.db)
        .await?;

    if existing > 0 {
        return Err(AppError::Conflict(EMAIL_TAKEN_MESSAGE.into()));
    }

    let pwd_hash = hash_password(&body.password)?;
    let user_id = Uuid::new_v4();

    // The account and its profile land together or not at all.
    let mut tx = state.db.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(&email)
    .bind(&pwd_hash)
    .execute(&mut *tx)
    .await
    // A concurrent registration can win between the check and the insert.
    .map_err(|e| AppError::conflict_on_unique(e, EMAIL_TAKEN_MESSAGE))?;
    insert_profile(&mut *tx, user_id, &email, body.username.as_deref(), false).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user_id, "User registered");

    let tokens = issue_token_pair(&state.db, user_id, &email, &state.config, None).await?;
    Ok(Json(tokens))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    body.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(normalize_email(&body.email))
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // The demo identity has no password and cannot sign in directly.
    let password_hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;
    if !verify_password(&body.password, password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let tokens = issue_token_pair(&state.db, user.id, &user.email, &state.config, None).await?;
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let token_data = verify_token(&body.refresh_token, &state.config)?;

    if token_data.claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized);
    }

    let token_hash = hash_token(&body.refresh_token);

    let (stored_id, stored_user_id, revoked) = sqlx::query_as::<_, (Uuid, Uuid, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE token_hash = $1
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Unauthorized)?;

    // A revoked token presented again means the family leaked.
    if revoked {
        tracing::warn!(
            user_id = %stored_user_id,
            token_id = %stored_id,
            "Refresh token reuse detected, revoking all tokens for user"
        );
        revoke_all_user_tokens(&state.db, stored_user_id).await?;
        return Err(AppError::Unauthorized);
    }

    if stored_user_id != token_data.claims.sub {
        return Err(AppError::Unauthorized);
    }

    // Single use: only the request that flips `revoked` may rotate. A loser
    // of a concurrent race is treated as reuse.
    if !claim_refresh_token(&state.db, stored_id).await? {
        tracing::warn!(
            user_id = %stored_user_id,
            token_id = %stored_id,
            "Concurrent refresh token reuse detected, revoking all tokens for user"
        );
        revoke_all_user_tokens(&state.db, stored_user_id).await?;
        return Err(AppError::Unauthorized);
    }

    let tokens = issue_token_pair(
        &state.db,
        token_data.claims.sub,
        &token_data.claims.email,
        &state.config,
        Some(stored_id),
    )
    .await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    // Demo sessions hold no refresh tokens; the access token simply lapses.
    if !auth_user.actor.is_demo() {
        revoke_all_user_tokens(&state.db, auth_user.id).await?;
    }
    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let owner = auth_user.actor.writable_owner("change password")?;
    body.validate()?;

    let pwd_hash = hash_password(&body.new_password)?;
    let updated = sqlx::query(
        "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(owner)
    .bind(&pwd_hash)
    .execute(&state.db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    // Other sessions must sign in again with the new password.
    let revoked = revoke_all_user_tokens(&state.db, owner).await?;
    tracing::info!(user_id = %owner, revoked_sessions = revoked, "Password changed");

    Ok(Json(serde_json::json!({ "message": "Password updated successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_deterministic() {
        let token = "test-refresh-token-value";
        let h1 = hash_token(token);
        let h2 = hash_token(token);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_hash_token_different_inputs() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn test_rotation_only_claims_live_tokens() {
        let sql = ROTATE_REFRESH_TOKEN_SQL.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(
            sql,
            "UPDATE refresh_tokens SET revoked = true, revoked_at = NOW() WHERE id = $1 AND revoked = false"
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Runner@Example.COM "), "runner@example.com");
    }
}
