//! Mark batch update and table import.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use attesta_core::{Error, Role};
use attesta_db::MarkChange;
use attesta_notify::NotifyEvent;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

/// Accepts a number, a numeric string, "н/а"/"na"/empty, or null.
/// Valid marks are 2–5; everything else is a validation error.
fn parse_mark_value(raw: Option<&serde_json::Value>) -> Result<Option<i16>, Error> {
    let Some(value) = raw else { return Ok(None) };
    let parsed = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| Error::validation(format!("неверный формат оценки: {n}")))?,
        serde_json::Value::String(s) => {
            let s = s.trim().to_lowercase();
            if s.is_empty() || s == "н/а" || s == "na" || s == "нет" {
                return Ok(None);
            }
            s.parse::<i64>()
                .map_err(|_| Error::validation(format!("оценка должна быть числом или 'н/а': {s}")))?
        }
        other => {
            return Err(Error::validation(format!("неверный формат оценки: {other}")));
        }
    };
    if !(2..=5).contains(&parsed) {
        return Err(Error::validation(format!(
            "оценка вне диапазона (2–5): {parsed}"
        )));
    }
    Ok(Some(parsed as i16))
}

#[derive(Debug, Deserialize)]
pub struct MarkUpdateBatch {
    pub marks: Vec<MarkUpdateItem>,
}

#[derive(Debug, Deserialize)]
pub struct MarkUpdateItem {
    pub student_id: i64,
    pub exam_id: i64,
    pub mark: Option<serde_json::Value>,
}

/// Upsert a batch of marks. Only rows whose value actually changed are
/// counted and announced; re-submitting the same value is a no-op.
pub async fn update_marks_batch(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(batch): Json<MarkUpdateBatch>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;

    let total = batch.marks.len();
    let mut updated_count = 0;
    let mut notices = Vec::new();

    for item in &batch.marks {
        let value = parse_mark_value(item.mark.as_ref())?;

        let discipline = state
            .store
            .exam_details(item.exam_id)
            .await
            .map(|e| e.discipline)
            .unwrap_or_else(|_| "Экзамен".to_string());

        let change = state
            .store
            .upsert_mark(item.student_id, item.exam_id, value)
            .await?;
        if change != MarkChange::Unchanged {
            updated_count += 1;
            notices.push(NotifyEvent::MarkChanged {
                student_id: item.student_id,
                discipline,
                value,
            });
        }
    }

    // One queued event per changed row; the single worker serializes
    // delivery, so a batch never bursts at the messaging platform.
    for notice in notices {
        if state.notify.send(notice).is_err() {
            tracing::error!("notify queue closed, mark notices dropped");
            break;
        }
    }

    tracing::info!(updated_count, total, "mark batch processed");
    Ok(Json(serde_json::json!({
        "detail": "Оценки успешно обновлены",
        "updated_count": updated_count,
        "total_attempts": total,
    })))
}

#[derive(Debug, Deserialize)]
pub struct MarkImportItem {
    /// Exam id the imported sheet belongs to.
    pub id: i64,
    pub last_first_name: String,
    pub mark: Option<serde_json::Value>,
}

/// Import marks from a spreadsheet-like payload. Rows that fail to
/// resolve or validate are collected as errors without aborting the rest.
pub async fn import_marks(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(rows): Json<Vec<MarkImportItem>>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    user.require_any(&[Role::Admin, Role::Curator])?;

    let total = rows.len();
    let mut imported = 0;
    let mut errors: Vec<String> = Vec::new();

    for row in &rows {
        let name_parts: Vec<&str> = row.last_first_name.split_whitespace().collect();
        if name_parts.len() < 2 {
            errors.push(format!("Некорректный формат имени: {}", row.last_first_name));
            continue;
        }
        let (last_name, first_name) = (name_parts[0], name_parts[1]);

        let student = match state
            .store
            .find_student_by_name_pair(last_name, first_name)
            .await
        {
            Ok(Some(student)) => student,
            Ok(None) => {
                errors.push(format!("Студент не найден: {}", row.last_first_name));
                continue;
            }
            Err(e) => {
                tracing::error!("mark import lookup failed: {e}");
                errors.push(format!("Ошибка записи: {}", row.last_first_name));
                continue;
            }
        };

        let value = match parse_mark_value(row.mark.as_ref()) {
            Ok(value) => value,
            Err(e) => {
                errors.push(format!("{e} ({})", row.last_first_name));
                continue;
            }
        };

        match state.store.upsert_mark(student.id, row.id, value).await {
            Ok(_) => imported += 1,
            Err(e) => {
                tracing::error!("mark import upsert failed: {e}");
                errors.push(format!("Ошибка записи: {}", row.last_first_name));
            }
        }
    }

    tracing::info!(imported, total, "mark import finished");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": format!("Импортировано оценок: {imported}"),
            "errors": errors,
            "total_attempts": total,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_na_mean_ungraded() {
        assert_eq!(parse_mark_value(None).unwrap(), None);
        assert_eq!(parse_mark_value(Some(&json!(null))).unwrap(), None);
        assert_eq!(parse_mark_value(Some(&json!("н/а"))).unwrap(), None);
        assert_eq!(parse_mark_value(Some(&json!("na"))).unwrap(), None);
        assert_eq!(parse_mark_value(Some(&json!(""))).unwrap(), None);
    }

    #[test]
    fn valid_range_is_accepted() {
        for v in 2..=5 {
            assert_eq!(parse_mark_value(Some(&json!(v))).unwrap(), Some(v as i16));
        }
        assert_eq!(parse_mark_value(Some(&json!("4"))).unwrap(), Some(4));
    }

    #[test]
    fn out_of_range_and_garbage_are_rejected() {
        assert!(parse_mark_value(Some(&json!(1))).is_err());
        assert!(parse_mark_value(Some(&json!(6))).is_err());
        assert!(parse_mark_value(Some(&json!("отлично"))).is_err());
        assert!(parse_mark_value(Some(&json!(4.5))).is_err());
    }
}
