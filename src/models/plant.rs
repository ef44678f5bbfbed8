// src/models/plant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{default_true, export_timestamp, not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: Uuid,
    #[schema(example = "Plant A")]
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlantPayload {
    #[validate(
        length(min = 1, max = 100, message = "Plant name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(length(max = 255, message = "Description is too long."))]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlantPayload {
    #[validate(
        length(min = 1, max = 100, message = "Plant name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Description is too long."))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

// Colunas da planilha: name, description, isActive
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlantImportRow {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlantExport {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Plant> for PlantExport {
    fn from(plant: Plant) -> Self {
        Self {
            created_at: export_timestamp(&plant.created_at),
            updated_at: export_timestamp(&plant.updated_at),
            name: plant.name,
            description: plant.description,
            is_active: plant.is_active,
        }
    }
}
