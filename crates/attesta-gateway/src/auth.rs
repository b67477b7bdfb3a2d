//! JWT issuance/verification and the authenticated-caller extractor.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use attesta_core::{Error, Result, Role};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub id: i64,
    pub exp: i64,
}

pub fn create_token(
    secret: &str,
    login: &str,
    role: Role,
    id: i64,
    ttl_minutes: i64,
) -> Result<String> {
    let claims = Claims {
        sub: login.to_string(),
        role,
        id,
        exp: (Utc::now() + Duration::minutes(ttl_minutes)).timestamp(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Config(format!("token signing failed: {e}")))
}

/// Decode and validate a token; expiry and signature failures both read
/// as unauthenticated.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized)
}

/// The verified caller, extracted from the Bearer header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub login: String,
    pub role: Role,
}

impl AuthUser {
    /// Gate: the caller's role must be on the allow-list.
    pub fn require_any(&self, allowed: &[Role]) -> Result<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!(
                login = %self.login,
                role = %self.role,
                "access denied: role not in allow-list"
            );
            Err(Error::Forbidden)
        }
    }

    /// Curators see only their own records; admins are unscoped.
    pub fn curator_scope(&self) -> Option<i64> {
        (self.role == Role::Curator).then_some(self.id)
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError(Error::Unauthorized))?;
        let claims = verify_token(&state.auth.secret_key, token).map_err(ApiError)?;
        Ok(AuthUser {
            id: claims.id,
            login: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip() {
        let token = create_token(SECRET, "ivanov", Role::Curator, 17, 60).unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "ivanov");
        assert_eq!(claims.role, Role::Curator);
        assert_eq!(claims.id, 17);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token(SECRET, "ivanov", Role::Admin, 1, -10).unwrap();
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(SECRET, "ivanov", Role::Admin, 1, 60).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
        assert!(verify_token(SECRET, "garbage").is_err());
    }

    #[test]
    fn role_gate() {
        let user = AuthUser {
            id: 5,
            login: "x".into(),
            role: Role::Curator,
        };
        assert!(user.require_any(&[Role::Admin, Role::Curator]).is_ok());
        assert!(matches!(
            user.require_any(&[Role::Admin]),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn scope_narrows_curators_only() {
        let curator = AuthUser {
            id: 5,
            login: "c".into(),
            role: Role::Curator,
        };
        let admin = AuthUser {
            id: 1,
            login: "a".into(),
            role: Role::Admin,
        };
        assert_eq!(curator.curator_scope(), Some(5));
        assert_eq!(admin.curator_scope(), None);
    }
}
