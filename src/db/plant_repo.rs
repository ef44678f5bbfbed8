// src/db/plant_repo.rs

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::resource::{BusinessKey, PartialUpdate, Resource, changed, changed_opt},
    models::plant::{CreatePlantPayload, Plant, PlantExport, UpdatePlantPayload},
    query::{ColumnKind, ColumnSpec, Scope, ScopeSpec},
};

pub struct Plants;

#[async_trait]
impl Resource for Plants {
    type Row = Plant;
    type Create = CreatePlantPayload;
    type Patch = UpdatePlantPayload;
    type Export = PlantExport;

    const ENTITY: &'static str = "Plant";
    const TABLE: &'static str = "plants";
    const SELECT: &'static str =
        "t.id, t.name, t.description, t.is_active, t.created_at, t.updated_at";
    const FROM: &'static str = "plants t";
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("description", ColumnKind::String, "description").sortable("t.description"),
        ColumnSpec::new("isActive", ColumnKind::Boolean, "is_active").sortable("t.is_active"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[ScopeSpec::new(Scope::Plant, "id", "id")];
    const KEY: Option<BusinessKey> = Some(BusinessKey { column: "name", label: "name" });
    const PAGES: &'static [&'static str] = &["/master/plants", "/master/lines", "/dashboard"];

    fn row_id(row: &Plant) -> Uuid {
        row.id
    }

    fn create_key(input: &CreatePlantPayload) -> Option<&str> {
        Some(&input.name)
    }

    fn patch_key(patch: &UpdatePlantPayload) -> Option<&str> {
        patch.name.as_deref()
    }

    fn diff(current: &Plant, patch: UpdatePlantPayload) -> UpdatePlantPayload {
        UpdatePlantPayload {
            name: changed(patch.name, &current.name),
            description: changed_opt(patch.description, &current.description),
            is_active: changed(patch.is_active, &current.is_active),
        }
    }

    fn is_noop(patch: &UpdatePlantPayload) -> bool {
        patch.name.is_none() && patch.description.is_none() && patch.is_active.is_none()
    }

    fn export(row: Plant) -> PlantExport {
        row.into()
    }

    async fn insert(conn: &mut PgConnection, input: &CreatePlantPayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO plants (id, name, description, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_active)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdatePlantPayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("name", patch.name.clone())
            .set("description", patch.description.clone())
            .set("is_active", patch.is_active)
            .execute(conn, id)
            .await
    }
}
