// src/handlers/import.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    services::import::ImportSummary,
};

// As linhas chegam como objetos JSON (uma por linha da planilha). O formato
// de cada uma é conferido linha a linha, para que uma linha ruim não derrube
// o lote.
type Rows = Result<Json<Vec<Value>>, JsonRejection>;

fn summary_response(summary: ImportSummary) -> ApiResponse<ImportSummary> {
    let message = format!(
        "{} row(s) imported, {} failed",
        summary.success_count, summary.failure_count
    );
    ApiResponse::ok(summary).with_message(message)
}

// POST /api/plants/import
#[utoipa::path(
    post,
    path = "/api/plants/import",
    tag = "Import",
    request_body = Vec<crate::models::plant::PlantImportRow>,
    responses(
        (status = 200, description = "Resumo da importação", body = ImportSummary),
        (status = 400, description = "Arquivo sem linhas")
    )
)]
pub async fn import_plants(
    State(state): State<AppState>,
    rows: Rows,
) -> Result<ApiResponse<ImportSummary>, AppError> {
    let Json(rows) = rows?;
    Ok(summary_response(state.plants.import(rows).await?))
}

// POST /api/lines/import
#[utoipa::path(
    post,
    path = "/api/lines/import",
    tag = "Import",
    request_body = Vec<crate::models::line::LineImportRow>,
    responses(
        (status = 200, description = "Resumo da importação", body = ImportSummary),
        (status = 400, description = "Arquivo sem linhas")
    )
)]
pub async fn import_lines(
    State(state): State<AppState>,
    rows: Rows,
) -> Result<ApiResponse<ImportSummary>, AppError> {
    let Json(rows) = rows?;
    Ok(summary_response(state.lines.import(rows, &state.plants).await?))
}

// POST /api/machines/import
#[utoipa::path(
    post,
    path = "/api/machines/import",
    tag = "Import",
    request_body = Vec<crate::models::machine::MachineImportRow>,
    responses(
        (status = 200, description = "Resumo da importação", body = ImportSummary),
        (status = 400, description = "Arquivo sem linhas")
    )
)]
pub async fn import_machines(
    State(state): State<AppState>,
    rows: Rows,
) -> Result<ApiResponse<ImportSummary>, AppError> {
    let Json(rows) = rows?;
    let summary = state.machines.import(rows, &state.lines, &state.machine_types).await?;
    Ok(summary_response(summary))
}

// POST /api/parts/import
#[utoipa::path(
    post,
    path = "/api/parts/import",
    tag = "Import",
    request_body = Vec<crate::models::part::PartImportRow>,
    responses(
        (status = 200, description = "Resumo da importação", body = ImportSummary),
        (status = 400, description = "Arquivo sem linhas")
    )
)]
pub async fn import_parts(
    State(state): State<AppState>,
    rows: Rows,
) -> Result<ApiResponse<ImportSummary>, AppError> {
    let Json(rows) = rows?;
    Ok(summary_response(state.parts.import(rows, &state.lines).await?))
}

// POST /api/child-parts/import
#[utoipa::path(
    post,
    path = "/api/child-parts/import",
    tag = "Import",
    request_body = Vec<crate::models::child_part::ChildPartImportRow>,
    responses(
        (status = 200, description = "Resumo da importação", body = ImportSummary),
        (status = 400, description = "Arquivo sem linhas")
    )
)]
pub async fn import_child_parts(
    State(state): State<AppState>,
    rows: Rows,
) -> Result<ApiResponse<ImportSummary>, AppError> {
    let Json(rows) = rows?;
    Ok(summary_response(state.child_parts.import(rows, &state.parts).await?))
}
