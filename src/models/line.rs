// src/models/line.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{default_true, export_timestamp, not_blank};

// Linha de produção. `plant_name` vem do JOIN com plants.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: Uuid,
    #[schema(example = "Line 1")]
    pub name: String,
    pub plant_id: Uuid,
    #[schema(example = "Plant A")]
    pub plant_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinePayload {
    #[validate(
        length(min = 1, max = 100, message = "Line name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    pub plant_id: Uuid,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinePayload {
    #[validate(
        length(min = 1, max = 100, message = "Line name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    pub plant_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

// Colunas da planilha: name, plantName, isActive
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineImportRow {
    pub name: String,
    pub plant_name: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineExport {
    pub name: String,
    pub plant_name: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Line> for LineExport {
    fn from(line: Line) -> Self {
        Self {
            created_at: export_timestamp(&line.created_at),
            updated_at: export_timestamp(&line.updated_at),
            name: line.name,
            plant_name: line.plant_name,
            is_active: line.is_active,
        }
    }
}
