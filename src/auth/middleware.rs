use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::actor::ActorContext;
use crate::auth::jwt::{verify_token, Claims, TokenType};
use crate::config::Config;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub actor: ActorContext,
}

impl AuthUser {
    /// Maps verified access-token claims onto the acting identity. Demo
    /// claims always resolve to the configured sample identity.
    pub fn from_claims(claims: Claims, config: &Config) -> Result<Self, AppError> {
        if claims.token_type != TokenType::Access {
            return Err(AppError::Unauthorized);
        }

        if claims.is_demo {
            if !config.demo_enabled {
                return Err(AppError::Unauthorized);
            }
            return Ok(Self {
                id: config.demo_user_id,
                actor: ActorContext::Demo(config.demo_user_id),
            });
        }

        Ok(Self {
            id: claims.sub,
            actor: ActorContext::User(claims.sub),
        })
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or(AppError::Unauthorized)?;
    let token_data = verify_token(token, &state.config)?;

    // Demo expiry rides on the token's own `exp`.
    let auth_user = AuthUser::from_claims(token_data.claims, &state.config)?;

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_demo_access_token, create_refresh_token};

    fn claims(token_type: TokenType, is_demo: bool) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "user@example.com".into(),
            exp: 0,
            iat: 0,
            token_type,
            jti: None,
            is_demo,
        }
    }

    #[test]
    fn test_access_claims_map_to_user_actor() {
        let config = Config::for_tests();
        let c = claims(TokenType::Access, false);
        let sub = c.sub;
        let user = AuthUser::from_claims(c, &config).unwrap();

        assert_eq!(user.id, sub);
        assert_eq!(user.actor, ActorContext::User(sub));
    }

    #[test]
    fn test_demo_claims_map_to_sample_identity() {
        let config = Config::for_tests();
        let user = AuthUser::from_claims(claims(TokenType::Access, true), &config).unwrap();

        assert_eq!(user.id, config.demo_user_id);
        assert_eq!(user.actor, ActorContext::Demo(config.demo_user_id));
    }

    #[test]
    fn test_demo_claims_rejected_when_disabled() {
        let mut config = Config::for_tests();
        config.demo_enabled = false;
        let token = create_demo_access_token(&config).unwrap();
        let data = verify_token(&token, &config).unwrap();

        assert!(matches!(
            AuthUser::from_claims(data.claims, &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let config = Config::for_tests();
        let token = create_refresh_token(Uuid::new_v4(), "a@example.com", &config).unwrap();
        let data = verify_token(&token, &config).unwrap();

        assert!(AuthUser::from_claims(data.claims, &config).is_err());
    }
}
