//! Curator routes (admin-only).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use attesta_core::{security, Role};
use attesta_db::{Curator, NewCurator};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

pub async fn list_curators(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Curator>>, ApiError> {
    user.require_any(&[Role::Admin])?;
    let curators = state.store.list_curators().await?;
    Ok(Json(curators))
}

pub async fn create_curator(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<NewCurator>,
) -> Result<(StatusCode, Json<Curator>), ApiError> {
    user.require_any(&[Role::Admin])?;
    let hash = security::hash_password(&body.password)?;
    let curator = state.store.create_curator(&body, &hash).await?;
    Ok((StatusCode::CREATED, Json(curator)))
}

/// Deletes the curator and, by cascade, their groups, students, exams,
/// and marks.
pub async fn delete_curator(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(curator_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_any(&[Role::Admin])?;
    state.store.delete_curator(curator_id).await?;
    Ok(Json(serde_json::json!({ "detail": "Куратор удален" })))
}
