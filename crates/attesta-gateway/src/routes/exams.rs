//! Exam routes. Mutations enqueue notification events; the worker loop
//! delivers them after the response is already on the wire.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use attesta_core::{ExamKind, Role};
use attesta_db::{Exam, ExamDocumentData, ExamListRow, NewExam, StudentMarkRow};
use attesta_notify::NotifyEvent;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ExamListQuery {
    pub exam_type: ExamKind,
}

pub async fn list_exams(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ExamListQuery>,
) -> Result<Json<Vec<ExamListRow>>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let rows = state
        .store
        .list_exams(query.exam_type.as_str(), user.curator_scope())
        .await?;
    Ok(Json(rows))
}

pub async fn create_exam(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(new): Json<NewExam>,
) -> Result<(StatusCode, Json<Exam>), ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let exam = state.store.create_exam(&new).await?;

    if state
        .notify
        .send(NotifyEvent::ExamCreated { exam_id: exam.id })
        .is_err()
    {
        tracing::error!(exam_id = exam.id, "notify queue closed, creation notice dropped");
    }

    Ok((StatusCode::CREATED, Json(exam)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateExamLink {
    pub link: Option<String>,
}

pub async fn update_exam_link(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(exam_id): Path<i64>,
    Json(body): Json<UpdateExamLink>,
) -> Result<Json<ExamListRow>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let row = state
        .store
        .update_exam_link(exam_id, body.link.as_deref())
        .await?;

    // Clearing a link is silent; only an attached ticket is announced.
    if let Some(link) = body.link {
        if state
            .notify
            .send(NotifyEvent::ExamLinkUpdated { exam_id, link })
            .is_err()
        {
            tracing::error!(exam_id, "notify queue closed, link notice dropped");
        }
    }

    Ok(Json(row))
}

#[derive(Debug, Serialize)]
pub struct ExamMarksResponse {
    pub exam_id: i64,
    pub discipline: String,
    pub holding_date: String,
    pub students: Vec<StudentMarkRow>,
}

pub async fn exam_marks(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(exam_id): Path<i64>,
) -> Result<Json<ExamMarksResponse>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let exam = state.store.exam_details(exam_id).await?;
    let students = state.store.marks_for_exam(exam_id).await?;
    Ok(Json(ExamMarksResponse {
        exam_id: exam.id,
        discipline: exam.discipline,
        holding_date: exam.holding_date,
        students,
    }))
}

pub async fn delete_exam(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(exam_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    state.store.delete_exam(exam_id).await?;
    Ok(Json(serde_json::json!({ "detail": "Экзамен удален" })))
}

/// Fully-resolved flat record for the external document generator.
pub async fn document_data(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(exam_id): Path<i64>,
) -> Result<Json<ExamDocumentData>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;
    let data = state.store.exam_document_data(exam_id).await?;
    Ok(Json(data))
}
