//! Error-to-status mapping for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use attesta_core::Error;

/// Wrapper so core errors can be returned straight out of handlers.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            Error::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what}: не найдено")),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Неверные учетные данные или токен".to_string(),
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                "Недостаточно прав доступа".to_string(),
            ),
            Error::Database(e) => {
                tracing::error!("database error surfaced to HTTP: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Внутренняя ошибка сервера".to_string(),
                )
            }
            other => {
                tracing::error!("unexpected error surfaced to HTTP: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Внутренняя ошибка сервера".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
