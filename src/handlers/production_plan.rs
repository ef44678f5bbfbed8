// src/handlers/production_plan.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
};

use crate::{
    common::{error::AppError, response::ApiResponse},
    models::production_plan::{ClosePlanPayload, ProductionPlan},
    services::PlanService,
};

// POST /api/production-plans/{id}/start
#[utoipa::path(
    post,
    path = "/api/production-plans/{id}/start",
    tag = "Production plans",
    params(("id" = String, Path, description = "ID do plano")),
    responses(
        (status = 200, description = "Plano em produção", body = ProductionPlan),
        (status = 404, description = "Plano não encontrado"),
        (status = 409, description = "Transição inválida para o status atual")
    )
)]
pub async fn start_plan(
    State(service): State<PlanService>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ProductionPlan>, AppError> {
    let plan = service.start(&id).await?;
    Ok(ApiResponse::ok(plan).with_message("Production plan started"))
}

// POST /api/production-plans/{id}/close
#[utoipa::path(
    post,
    path = "/api/production-plans/{id}/close",
    tag = "Production plans",
    params(("id" = String, Path, description = "ID do plano")),
    request_body = ClosePlanPayload,
    responses(
        (status = 200, description = "Plano encerrado", body = ProductionPlan),
        (status = 400, description = "Quantidades inválidas"),
        (status = 404, description = "Plano não encontrado"),
        (status = 409, description = "Transição inválida para o status atual")
    )
)]
pub async fn close_plan(
    State(service): State<PlanService>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ApiResponse<ProductionPlan>, AppError> {
    // Corpo opcional: sem ele o plano fecha com as contagens já lançadas
    let counts = if body.iter().all(u8::is_ascii_whitespace) {
        ClosePlanPayload::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ValidationError(format!("Invalid request body: {e}")))?
    };
    let plan = service.close(&id, counts).await?;
    Ok(ApiResponse::ok(plan).with_message("Production plan closed"))
}

// POST /api/production-plans/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/production-plans/{id}/cancel",
    tag = "Production plans",
    params(("id" = String, Path, description = "ID do plano")),
    responses(
        (status = 200, description = "Plano cancelado", body = ProductionPlan),
        (status = 404, description = "Plano não encontrado"),
        (status = 409, description = "Transição inválida para o status atual")
    )
)]
pub async fn cancel_plan(
    State(service): State<PlanService>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ProductionPlan>, AppError> {
    let plan = service.cancel(&id).await?;
    Ok(ApiResponse::ok(plan).with_message("Production plan canceled"))
}
