// src/handlers/health.rs

use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::common::response::ApiResponse;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub database: bool,
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Serviço e banco no ar", body = HealthStatus),
        (status = 503, description = "Banco indisponível")
    )
)]
pub async fn health(State(pool): State<PgPool>) -> (StatusCode, ApiResponse<HealthStatus>) {
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => (StatusCode::OK, ApiResponse::ok(HealthStatus { database: true })),
        Err(e) => {
            tracing::error!("❌ Health check sem banco: {}", e);
            let body = ApiResponse::ok(HealthStatus { database: false }).with_message("Database unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, ApiResponse { success: false, ..body })
        }
    }
}
