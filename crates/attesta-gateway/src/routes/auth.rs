//! Login and admin registration.
//!
//! The presented secret key determines which principal table is
//! consulted: the admin key selects admins, the curator key curators,
//! and no key means a student login. One lookup per attempt.

use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use attesta_core::config::AuthConfig;
use attesta_core::{security, Error, Role};

use crate::auth::create_token;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub secret_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
    pub username: String,
}

fn role_for_key(auth: &AuthConfig, secret_key: Option<&str>) -> Result<Role, Error> {
    match secret_key {
        None | Some("") => Ok(Role::Student),
        Some(key) if !auth.admin_key.is_empty() && key == auth.admin_key => Ok(Role::Admin),
        Some(key) if !auth.curator_key.is_empty() && key == auth.curator_key => Ok(Role::Curator),
        Some(_) => Err(Error::Unauthorized),
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    if form.password.is_empty() {
        return Err(Error::validation("пустой пароль").into());
    }

    let role = role_for_key(&state.auth, form.secret_key.as_deref())?;
    let principal = state
        .store
        .find_principal(role, &form.username)
        .await?
        .ok_or(Error::Unauthorized)?;

    let stored_hash = principal.password.as_deref().ok_or(Error::Unauthorized)?;
    if !security::verify_password(&form.password, stored_hash) {
        tracing::warn!(username = %form.username, "login failed: bad credentials");
        return Err(Error::Unauthorized.into());
    }

    let token = create_token(
        &state.auth.secret_key,
        &principal.login,
        principal.role,
        principal.id,
        state.auth.token_ttl_minutes,
    )?;

    tracing::info!(username = %principal.login, role = %principal.role, "login succeeded");
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        role: principal.role,
        username: principal.login,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub secret_key: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub username: String,
    pub role: Role,
    pub access_token: String,
}

/// Self-registration is admin-only and gated by the admin key.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let role = role_for_key(&state.auth, Some(&form.secret_key))?;
    if role != Role::Admin {
        tracing::warn!(username = %form.username, %role, "registration rejected for non-admin role");
        return Err(Error::Forbidden.into());
    }

    let hash = security::hash_password(&form.password)?;
    let admin = state.store.create_admin(&form.username, &hash).await?;
    let token = create_token(
        &state.auth.secret_key,
        &admin.login,
        Role::Admin,
        admin.id,
        state.auth.token_ttl_minutes,
    )?;

    Ok(Json(RegisterResponse {
        username: admin.login,
        role: Role::Admin,
        access_token: token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            secret_key: "s".into(),
            token_ttl_minutes: 60,
            admin_key: "adm-key".into(),
            curator_key: "cur-key".into(),
        }
    }

    #[test]
    fn key_selects_role() {
        let auth = auth_config();
        assert_eq!(role_for_key(&auth, None).unwrap(), Role::Student);
        assert_eq!(role_for_key(&auth, Some("")).unwrap(), Role::Student);
        assert_eq!(role_for_key(&auth, Some("adm-key")).unwrap(), Role::Admin);
        assert_eq!(role_for_key(&auth, Some("cur-key")).unwrap(), Role::Curator);
        assert!(role_for_key(&auth, Some("wrong")).is_err());
    }

    #[test]
    fn empty_configured_keys_never_match() {
        let auth = AuthConfig {
            admin_key: String::new(),
            curator_key: String::new(),
            ..auth_config()
        };
        assert!(role_for_key(&auth, Some("")).is_ok());
        assert!(role_for_key(&auth, Some("anything")).is_err());
    }
}
