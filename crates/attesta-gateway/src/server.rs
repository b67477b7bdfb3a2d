//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use attesta_core::config::AuthConfig;
use attesta_db::Store;
use attesta_notify::NotifySender;

use crate::routes;

/// Shared state for the gateway.
pub struct AppState {
    pub store: Store,
    pub notify: NotifySender,
    pub auth: AuthConfig,
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "attesta-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/register", post(routes::auth::register))
        .route("/exam", get(routes::exams::list_exams))
        .route("/exam/create", post(routes::exams::create_exam))
        .route("/exam/{exam_id}/link", patch(routes::exams::update_exam_link))
        .route("/exam/{exam_id}/marks", get(routes::exams::exam_marks))
        .route(
            "/exam/{exam_id}/document-data",
            get(routes::exams::document_data),
        )
        .route("/exam/{exam_id}", delete(routes::exams::delete_exam))
        .route("/group", get(routes::groups::list_groups))
        .route("/group/create", post(routes::groups::create_group))
        .route(
            "/group/{group_id}",
            patch(routes::groups::update_group).delete(routes::groups::delete_group),
        )
        .route("/group/{group_id}/students", get(routes::groups::group_students))
        .route("/student", get(routes::students::list_students))
        .route("/student/create", post(routes::students::create_student))
        .route(
            "/student/{student_id}",
            patch(routes::students::update_student).delete(routes::students::delete_student),
        )
        .route("/curator", get(routes::curators::list_curators))
        .route("/curator/create", post(routes::curators::create_curator))
        .route("/curator/{curator_id}", delete(routes::curators::delete_curator))
        .route("/mark/batch", patch(routes::marks::update_marks_batch))
        .route("/mark/import", post(routes::marks::import_marks));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .max_age(std::time::Duration::from_secs(3600));

            // Restrict CORS origins in production via env var, e.g.
            // ATTESTA_CORS_ORIGINS=https://attesta.example,https://admin.attesta.example
            if let Ok(origins_str) = std::env::var("ATTESTA_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("gateway listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
