// src/models/downtime.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{export_date, export_timestamp, not_blank};

// PLANNED = parada planejada (PDT), UNPLANNED = não planejada (UPDT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "downtime_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DowntimeKind {
    Planned,
    Unplanned,
}

impl DowntimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DowntimeKind::Planned => "PLANNED",
            DowntimeKind::Unplanned => "UNPLANNED",
        }
    }
}

// --- Categorias ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeCategory {
    pub id: Uuid,
    #[schema(example = "MC-BRK")]
    pub code: String,
    #[schema(example = "Machine breakdown")]
    pub name: String,
    pub kind: DowntimeKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDowntimeCategoryPayload {
    #[validate(
        length(min = 1, max = 20, message = "Category code must be between 1 and 20 characters."),
        custom(function = "not_blank")
    )]
    pub code: String,
    #[validate(
        length(min = 1, max = 100, message = "Category name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    pub kind: DowntimeKind,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDowntimeCategoryPayload {
    #[validate(
        length(min = 1, max = 20, message = "Category code must be between 1 and 20 characters."),
        custom(function = "not_blank")
    )]
    pub code: Option<String>,
    #[validate(
        length(min = 1, max = 100, message = "Category name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    pub kind: Option<DowntimeKind>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeCategoryExport {
    pub code: String,
    pub name: String,
    pub kind: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DowntimeCategory> for DowntimeCategoryExport {
    fn from(category: DowntimeCategory) -> Self {
        Self {
            kind: category.kind.as_str().to_string(),
            created_at: export_timestamp(&category.created_at),
            updated_at: export_timestamp(&category.updated_at),
            code: category.code,
            name: category.name,
        }
    }
}

// --- Paradas registradas ---

// Parada lançada contra um plano de produção.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Downtime {
    pub id: Uuid,
    pub production_plan_id: Uuid,
    #[schema(value_type = String, example = "2026-03-14")]
    pub plan_date: NaiveDate,
    pub line_id: Uuid,
    pub line_name: String,
    pub shift_name: String,
    pub category_id: Uuid,
    pub category_code: String,
    pub category_name: String,
    pub category_kind: DowntimeKind,
    #[schema(example = 25)]
    pub duration_minutes: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDowntimePayload {
    pub production_plan_id: Uuid,
    pub category_id: Uuid,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes."))]
    pub duration_minutes: i32,
    #[validate(length(max = 500, message = "Note is too long."))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDowntimePayload {
    pub production_plan_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes."))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 500, message = "Note is too long."))]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeExport {
    pub plan_date: String,
    pub line_name: String,
    pub shift_name: String,
    pub category_code: String,
    pub category_name: String,
    pub category_kind: String,
    pub duration_minutes: i32,
    pub note: Option<String>,
    pub created_at: String,
}

impl From<Downtime> for DowntimeExport {
    fn from(downtime: Downtime) -> Self {
        Self {
            plan_date: export_date(&downtime.plan_date),
            category_kind: downtime.category_kind.as_str().to_string(),
            created_at: export_timestamp(&downtime.created_at),
            line_name: downtime.line_name,
            shift_name: downtime.shift_name,
            category_code: downtime.category_code,
            category_name: downtime.category_name,
            duration_minutes: downtime.duration_minutes,
            note: downtime.note,
        }
    }
}
