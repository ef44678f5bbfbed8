// src/models/production_plan.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::validation::{export_date, export_timestamp},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plan_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Open,
    Running,
    Closed,
    Canceled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Open => "OPEN",
            PlanStatus::Running => "RUNNING",
            PlanStatus::Closed => "CLOSED",
            PlanStatus::Canceled => "CANCELED",
        }
    }
}

/// Ações do ciclo de vida disparadas pelas rotas start/close/cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    Start,
    Close,
    Cancel,
}

impl PlanAction {
    /// Estado resultante da ação, ou erro se a transição não é permitida.
    pub fn apply(self, from: PlanStatus) -> Result<PlanStatus, AppError> {
        let to = match self {
            PlanAction::Start => PlanStatus::Running,
            PlanAction::Close => PlanStatus::Closed,
            PlanAction::Cancel => PlanStatus::Canceled,
        };
        let allowed = matches!(
            (from, self),
            (PlanStatus::Open, PlanAction::Start)
                | (PlanStatus::Running, PlanAction::Close)
                | (PlanStatus::Open | PlanStatus::Running, PlanAction::Cancel)
        );
        if allowed {
            Ok(to)
        } else {
            Err(AppError::InvalidTransition {
                from: from.as_str(),
                to: to.as_str(),
            })
        }
    }
}

// Plano achatado com nomes de linha, peça e turno.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlan {
    pub id: Uuid,
    #[schema(value_type = String, example = "2026-03-14")]
    pub plan_date: NaiveDate,
    pub line_id: Uuid,
    pub line_name: String,
    pub plant_id: Uuid,
    pub plant_name: String,
    pub part_id: Uuid,
    pub part_no: String,
    pub part_name: String,
    pub shift_id: Uuid,
    pub shift_name: String,
    #[schema(value_type = String)]
    pub shift_start: NaiveTime,
    #[schema(value_type = String)]
    pub shift_end: NaiveTime,
    #[schema(example = 1200)]
    pub planned_qty: i32,
    pub actual_qty: i32,
    pub reject_qty: i32,
    pub status: PlanStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductionPlanPayload {
    #[schema(value_type = String, example = "2026-03-14")]
    pub plan_date: NaiveDate,
    pub line_id: Uuid,
    pub part_id: Uuid,
    pub shift_id: Uuid,
    #[validate(range(min = 1, message = "Planned quantity must be at least 1."))]
    pub planned_qty: i32,
}

// Status só muda pelas rotas de ciclo de vida.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductionPlanPayload {
    #[schema(value_type = Option<String>)]
    pub plan_date: Option<NaiveDate>,
    pub line_id: Option<Uuid>,
    pub part_id: Option<Uuid>,
    pub shift_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Planned quantity must be at least 1."))]
    pub planned_qty: Option<i32>,
    #[validate(range(min = 0, message = "Actual quantity must not be negative."))]
    pub actual_qty: Option<i32>,
    #[validate(range(min = 0, message = "Reject quantity must not be negative."))]
    pub reject_qty: Option<i32>,
}

/// Contagens finais informadas ao encerrar o plano.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClosePlanPayload {
    #[validate(range(min = 0, message = "Actual quantity must not be negative."))]
    pub actual_qty: Option<i32>,
    #[validate(range(min = 0, message = "Reject quantity must not be negative."))]
    pub reject_qty: Option<i32>,
}

/// Refugo nunca passa da produção real.
pub fn check_counts(actual: i32, reject: i32) -> Result<(), AppError> {
    if reject > actual {
        return Err(AppError::ValidationError(
            "Reject quantity cannot exceed actual quantity.".into(),
        ));
    }
    Ok(())
}

impl UpdateProductionPlanPayload {
    /// Valida as contagens que o plano terá depois do patch.
    pub fn check_counts(&self, current: &ProductionPlan) -> Result<(), AppError> {
        check_counts(
            self.actual_qty.unwrap_or(current.actual_qty),
            self.reject_qty.unwrap_or(current.reject_qty),
        )
    }
}

impl ClosePlanPayload {
    /// Campo ausente mantém a contagem já lançada no plano.
    pub fn check_counts(&self, current: &ProductionPlan) -> Result<(), AppError> {
        check_counts(
            self.actual_qty.unwrap_or(current.actual_qty),
            self.reject_qty.unwrap_or(current.reject_qty),
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlanExport {
    pub plan_date: String,
    pub plant_name: String,
    pub line_name: String,
    pub part_no: String,
    pub part_name: String,
    pub shift_name: String,
    pub planned_qty: i32,
    pub actual_qty: i32,
    pub reject_qty: i32,
    pub status: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl From<ProductionPlan> for ProductionPlanExport {
    fn from(plan: ProductionPlan) -> Self {
        Self {
            plan_date: export_date(&plan.plan_date),
            status: plan.status.as_str().to_string(),
            started_at: plan.started_at.as_ref().map(export_timestamp),
            ended_at: plan.ended_at.as_ref().map(export_timestamp),
            plant_name: plan.plant_name,
            line_name: plan.line_name,
            part_no: plan.part_no,
            part_name: plan.part_name,
            shift_name: plan.shift_name,
            planned_qty: plan.planned_qty,
            actual_qty: plan.actual_qty,
            reject_qty: plan.reject_qty,
        }
    }
}
