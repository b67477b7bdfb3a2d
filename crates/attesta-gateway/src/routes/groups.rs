//! Group routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use attesta_core::Role;
use attesta_db::{Group, GroupStudentRow};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Group>>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let groups = state.store.list_groups(user.curator_scope()).await?;
    Ok(Json(groups))
}

#[derive(Debug, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub curator_id: i64,
}

pub async fn create_group(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateGroup>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    user.require_any(&[Role::Admin])?;
    let group = state.store.create_group(&body.name, body.curator_id).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub curator_id: Option<i64>,
}

pub async fn update_group(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
    Json(body): Json<UpdateGroup>,
) -> Result<Json<Group>, ApiError> {
    user.require_any(&[Role::Admin])?;
    let group = state
        .store
        .update_group(group_id, body.name.as_deref(), body.curator_id)
        .await?;
    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_any(&[Role::Admin])?;
    state.store.delete_group(group_id).await?;
    Ok(Json(serde_json::json!({ "detail": "Группа удалена" })))
}

#[derive(Debug, Deserialize)]
pub struct GroupStudentsQuery {
    pub exam_id: Option<i64>,
}

/// Students of a group, with their mark for `exam_id` when given.
pub async fn group_students(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
    Query(query): Query<GroupStudentsQuery>,
) -> Result<Json<Vec<GroupStudentRow>>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let rows = state
        .store
        .students_of_group(group_id, query.exam_id)
        .await?;
    Ok(Json(rows))
}
