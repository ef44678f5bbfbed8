// src/models/child_part.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{export_timestamp, not_blank};

// Componente de uma peça. `part_no`/`line_*` são do pai.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildPart {
    pub id: Uuid,
    #[schema(example = "C-1001-A")]
    pub child_part_no: String,
    pub name: String,
    pub part_id: Uuid,
    pub part_no: String,
    pub part_name: String,
    pub line_id: Uuid,
    pub line_name: String,
    #[schema(example = 2)]
    pub qty_per_part: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChildPartPayload {
    #[validate(
        length(min = 1, max = 50, message = "Child part number must be between 1 and 50 characters."),
        custom(function = "not_blank")
    )]
    pub child_part_no: String,
    #[validate(
        length(min = 1, max = 150, message = "Child part name must be between 1 and 150 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    pub part_id: Uuid,
    #[validate(range(min = 1, message = "Quantity per part must be at least 1."))]
    pub qty_per_part: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChildPartPayload {
    #[validate(
        length(min = 1, max = 50, message = "Child part number must be between 1 and 50 characters."),
        custom(function = "not_blank")
    )]
    pub child_part_no: Option<String>,
    #[validate(
        length(min = 1, max = 150, message = "Child part name must be between 1 and 150 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    pub part_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity per part must be at least 1."))]
    pub qty_per_part: Option<i32>,
}

// Colunas da planilha: childPartNo, name, partNo, qtyPerPart
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildPartImportRow {
    pub child_part_no: String,
    pub name: String,
    pub part_no: String,
    pub qty_per_part: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildPartExport {
    pub child_part_no: String,
    pub name: String,
    pub part_no: String,
    pub part_name: String,
    pub line_name: String,
    pub qty_per_part: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ChildPart> for ChildPartExport {
    fn from(child: ChildPart) -> Self {
        Self {
            created_at: export_timestamp(&child.created_at),
            updated_at: export_timestamp(&child.updated_at),
            child_part_no: child.child_part_no,
            name: child.name,
            part_no: child.part_no,
            part_name: child.part_name,
            line_name: child.line_name,
            qty_per_part: child.qty_per_part,
        }
    }
}
