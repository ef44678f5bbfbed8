// src/db/line_repo.rs

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::resource::{BusinessKey, PLANT_PARENT, ParentRef, PartialUpdate, Resource, changed},
    models::line::{CreateLinePayload, Line, LineExport, UpdateLinePayload},
    query::{ColumnKind, ColumnSpec, Join, Scope, ScopeSpec},
};

pub const PLANT: Join = Join::BelongsTo { table: "plants", foreign_key: "plant_id" };

pub struct Lines;

#[async_trait]
impl Resource for Lines {
    type Row = Line;
    type Create = CreateLinePayload;
    type Patch = UpdateLinePayload;
    type Export = LineExport;

    const ENTITY: &'static str = "Line";
    const TABLE: &'static str = "lines";
    const SELECT: &'static str = r#"
        t.id, t.name, t.plant_id, pl.name AS plant_name, t.is_active,
        t.created_at, t.updated_at
    "#;
    const FROM: &'static str = "lines t JOIN plants pl ON pl.id = t.plant_id";
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("plantName", ColumnKind::String, "name")
            .via(&[PLANT])
            .sortable("pl.name"),
        ColumnSpec::new("isActive", ColumnKind::Boolean, "is_active").sortable("t.is_active"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[
        ScopeSpec::new(Scope::Plant, "plantId", "id").via(&[PLANT]),
        ScopeSpec::new(Scope::Line, "id", "id"),
    ];
    // Nome de linha é único no sistema todo, não só dentro da planta.
    const KEY: Option<BusinessKey> = Some(BusinessKey { column: "name", label: "name" });
    const PAGES: &'static [&'static str] = &[
        "/master/lines",
        "/master/machines",
        "/master/parts",
        "/master/shifts",
        "/dashboard",
    ];

    fn row_id(row: &Line) -> Uuid {
        row.id
    }

    fn create_key(input: &CreateLinePayload) -> Option<&str> {
        Some(&input.name)
    }

    fn patch_key(patch: &UpdateLinePayload) -> Option<&str> {
        patch.name.as_deref()
    }

    fn diff(current: &Line, patch: UpdateLinePayload) -> UpdateLinePayload {
        UpdateLinePayload {
            name: changed(patch.name, &current.name),
            plant_id: changed(patch.plant_id, &current.plant_id),
            is_active: changed(patch.is_active, &current.is_active),
        }
    }

    fn is_noop(patch: &UpdateLinePayload) -> bool {
        patch.name.is_none() && patch.plant_id.is_none() && patch.is_active.is_none()
    }

    fn export(row: Line) -> LineExport {
        row.into()
    }

    fn create_parents(input: &CreateLinePayload) -> Vec<(ParentRef, Uuid)> {
        vec![(PLANT_PARENT, input.plant_id)]
    }

    fn patch_parents(patch: &UpdateLinePayload) -> Vec<(ParentRef, Uuid)> {
        patch.plant_id.map(|id| (PLANT_PARENT, id)).into_iter().collect()
    }

    async fn insert(conn: &mut PgConnection, input: &CreateLinePayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO lines (id, name, plant_id, is_active) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.plant_id)
        .bind(input.is_active)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdateLinePayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("name", patch.name.clone())
            .set("plant_id", patch.plant_id)
            .set("is_active", patch.is_active)
            .execute(conn, id)
            .await
    }
}
