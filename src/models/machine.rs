// src/models/machine.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{default_true, export_timestamp, not_blank};

// --- Tipos de máquina ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineType {
    pub id: Uuid,
    #[schema(example = "Injection Molding")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMachineTypePayload {
    #[validate(
        length(min = 1, max = 100, message = "Machine type name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(length(max = 255, message = "Description is too long."))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachineTypePayload {
    #[validate(
        length(min = 1, max = 100, message = "Machine type name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Description is too long."))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineTypeExport {
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MachineType> for MachineTypeExport {
    fn from(kind: MachineType) -> Self {
        Self {
            created_at: export_timestamp(&kind.created_at),
            updated_at: export_timestamp(&kind.updated_at),
            name: kind.name,
            description: kind.description,
        }
    }
}

// --- Máquinas ---

// Máquina instalada numa linha. Planta e tipo vêm dos JOINs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: Uuid,
    #[schema(example = "INJ-01")]
    pub name: String,
    pub line_id: Uuid,
    pub line_name: String,
    pub plant_id: Uuid,
    pub plant_name: String,
    pub machine_type_id: Uuid,
    pub machine_type_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMachinePayload {
    #[validate(
        length(min = 1, max = 100, message = "Machine name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    pub line_id: Uuid,
    pub machine_type_id: Uuid,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachinePayload {
    #[validate(
        length(min = 1, max = 100, message = "Machine name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    pub line_id: Option<Uuid>,
    pub machine_type_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

// Colunas da planilha: name, lineName, machineTypeName, isActive
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineImportRow {
    pub name: String,
    pub line_name: String,
    pub machine_type_name: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineExport {
    pub name: String,
    pub line_name: String,
    pub plant_name: String,
    pub machine_type_name: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Machine> for MachineExport {
    fn from(machine: Machine) -> Self {
        Self {
            created_at: export_timestamp(&machine.created_at),
            updated_at: export_timestamp(&machine.updated_at),
            name: machine.name,
            line_name: machine.line_name,
            plant_name: machine.plant_name,
            machine_type_name: machine.machine_type_name,
            is_active: machine.is_active,
        }
    }
}
