// src/models/part.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{default_true, export_timestamp, not_blank};

// Peça produzida numa linha. `cycle_time_sec` é o tempo de ciclo padrão.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: Uuid,
    #[schema(example = "P-1001")]
    pub part_no: String,
    pub name: String,
    pub line_id: Uuid,
    pub line_name: String,
    pub plant_id: Uuid,
    pub plant_name: String,
    #[schema(example = 42.5)]
    pub cycle_time_sec: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartPayload {
    #[validate(
        length(min = 1, max = 50, message = "Part number must be between 1 and 50 characters."),
        custom(function = "not_blank")
    )]
    pub part_no: String,
    #[validate(
        length(min = 1, max = 150, message = "Part name must be between 1 and 150 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    pub line_id: Uuid,
    #[validate(range(min = 0.0, message = "Cycle time must not be negative."))]
    #[serde(default)]
    pub cycle_time_sec: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartPayload {
    #[validate(
        length(min = 1, max = 50, message = "Part number must be between 1 and 50 characters."),
        custom(function = "not_blank")
    )]
    pub part_no: Option<String>,
    #[validate(
        length(min = 1, max = 150, message = "Part name must be between 1 and 150 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    pub line_id: Option<Uuid>,
    #[validate(range(min = 0.0, message = "Cycle time must not be negative."))]
    pub cycle_time_sec: Option<f64>,
    pub is_active: Option<bool>,
}

// Colunas da planilha: partNo, name, lineName, cycleTimeSec
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartImportRow {
    pub part_no: String,
    pub name: String,
    pub line_name: String,
    pub cycle_time_sec: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartExport {
    pub part_no: String,
    pub name: String,
    pub line_name: String,
    pub plant_name: String,
    pub cycle_time_sec: f64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Part> for PartExport {
    fn from(part: Part) -> Self {
        Self {
            created_at: export_timestamp(&part.created_at),
            updated_at: export_timestamp(&part.updated_at),
            part_no: part.part_no,
            name: part.name,
            line_name: part.line_name,
            plant_name: part.plant_name,
            cycle_time_sec: part.cycle_time_sec,
            is_active: part.is_active,
        }
    }
}
