//! Student routes. Credentials are never set here — the bot flow owns
//! password and handle binding.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use attesta_core::Role;
use attesta_db::{NewStudent, Student, StudentPatch};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

pub async fn list_students(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Student>>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let students = state.store.list_students(user.curator_scope()).await?;
    Ok(Json(students))
}

pub async fn create_student(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<NewStudent>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let student = state.store.create_student(&body).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(student_id): Path<i64>,
    Json(patch): Json<StudentPatch>,
) -> Result<Json<Student>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let student = state.store.update_student(student_id, &patch).await?;
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(student_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_any(&[Role::Admin])?;
    state.store.delete_student(student_id).await?;
    Ok(Json(serde_json::json!({ "detail": "Студент удален" })))
}
