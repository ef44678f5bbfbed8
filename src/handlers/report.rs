// src/handlers/report.rs

use axum::extract::{Query, State, rejection::QueryRejection};

use crate::{
    common::{error::AppError, response::ApiResponse},
    models::report::{AchievementEntry, OeeEntry, ParetoEntry, ReportQuery},
    services::ReportService,
};

// GET /api/reports/oee
#[utoipa::path(
    get,
    path = "/api/reports/oee",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "OEE por período ou linha", body = Vec<OeeEntry>),
        (status = 400, description = "Intervalo de datas inválido")
    )
)]
pub async fn get_oee(
    State(service): State<ReportService>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<OeeEntry>>, AppError> {
    let Query(query) = query?;
    Ok(ApiResponse::ok(service.oee(&query).await?))
}

// GET /api/reports/achievement
#[utoipa::path(
    get,
    path = "/api/reports/achievement",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Realizado x planejado", body = Vec<AchievementEntry>),
        (status = 400, description = "Intervalo de datas inválido")
    )
)]
pub async fn get_achievement(
    State(service): State<ReportService>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<AchievementEntry>>, AppError> {
    let Query(query) = query?;
    Ok(ApiResponse::ok(service.achievement(&query).await?))
}

// GET /api/reports/downtime-pareto
#[utoipa::path(
    get,
    path = "/api/reports/downtime-pareto",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Paradas por categoria, da maior para a menor", body = Vec<ParetoEntry>),
        (status = 400, description = "Intervalo de datas inválido")
    )
)]
pub async fn get_downtime_pareto(
    State(service): State<ReportService>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<ParetoEntry>>, AppError> {
    let Query(query) = query?;
    Ok(ApiResponse::ok(service.downtime_pareto(&query).await?))
}
