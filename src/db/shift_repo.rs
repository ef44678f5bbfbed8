// src/db/shift_repo.rs

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        line_repo::PLANT,
        machine_repo::LINE,
        resource::{BusinessKey, LINE_PARENT, ParentRef, PartialUpdate, Resource, changed},
    },
    models::shift::{CreateShiftPayload, Shift, ShiftExport, UpdateShiftPayload},
    query::{ColumnKind, ColumnSpec, Scope, ScopeSpec},
};

pub struct Shifts;

#[async_trait]
impl Resource for Shifts {
    type Row = Shift;
    type Create = CreateShiftPayload;
    type Patch = UpdateShiftPayload;
    type Export = ShiftExport;

    const ENTITY: &'static str = "Shift";
    const TABLE: &'static str = "shifts";
    const SELECT: &'static str = r#"
        t.id, t.name, t.line_id, ln.name AS line_name, t.start_time, t.end_time,
        t.created_at, t.updated_at
    "#;
    const FROM: &'static str = "shifts t JOIN lines ln ON ln.id = t.line_id";
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("lineName", ColumnKind::String, "name")
            .via(&[LINE])
            .sortable("ln.name"),
        ColumnSpec::new("startTime", ColumnKind::String, "start_time::text").sortable("t.start_time"),
        ColumnSpec::new("endTime", ColumnKind::String, "end_time::text").sortable("t.end_time"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[
        ScopeSpec::new(Scope::Plant, "plantId", "id").via(&[LINE, PLANT]),
        ScopeSpec::new(Scope::Line, "lineId", "id").via(&[LINE]),
        ScopeSpec::new(Scope::Shift, "id", "id"),
    ];
    // Global, como o nome de linha.
    const KEY: Option<BusinessKey> = Some(BusinessKey { column: "name", label: "name" });
    const PAGES: &'static [&'static str] = &["/master/shifts", "/production/plans"];

    fn row_id(row: &Shift) -> Uuid {
        row.id
    }

    fn create_key(input: &CreateShiftPayload) -> Option<&str> {
        Some(&input.name)
    }

    fn patch_key(patch: &UpdateShiftPayload) -> Option<&str> {
        patch.name.as_deref()
    }

    fn diff(current: &Shift, patch: UpdateShiftPayload) -> UpdateShiftPayload {
        UpdateShiftPayload {
            name: changed(patch.name, &current.name),
            line_id: changed(patch.line_id, &current.line_id),
            start_time: changed(patch.start_time, &current.start_time),
            end_time: changed(patch.end_time, &current.end_time),
        }
    }

    fn is_noop(patch: &UpdateShiftPayload) -> bool {
        patch.name.is_none()
            && patch.line_id.is_none()
            && patch.start_time.is_none()
            && patch.end_time.is_none()
    }

    fn export(row: Shift) -> ShiftExport {
        row.into()
    }

    fn create_parents(input: &CreateShiftPayload) -> Vec<(ParentRef, Uuid)> {
        vec![(LINE_PARENT, input.line_id)]
    }

    fn patch_parents(patch: &UpdateShiftPayload) -> Vec<(ParentRef, Uuid)> {
        patch.line_id.map(|id| (LINE_PARENT, id)).into_iter().collect()
    }

    async fn insert(conn: &mut PgConnection, input: &CreateShiftPayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO shifts (id, name, line_id, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.line_id)
        .bind(input.start_time)
        .bind(input.end_time)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdateShiftPayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("name", patch.name.clone())
            .set("line_id", patch.line_id)
            .set("start_time", patch.start_time)
            .set("end_time", patch.end_time)
            .execute(conn, id)
            .await
    }
}
