// src/db/part_repo.rs

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        line_repo::PLANT,
        machine_repo::LINE,
        resource::{
            BusinessKey, LINE_PARENT, PART_PARENT, ParentRef, PartialUpdate, Resource, changed,
        },
    },
    models::{
        child_part::{ChildPart, ChildPartExport, CreateChildPartPayload, UpdateChildPartPayload},
        part::{CreatePartPayload, Part, PartExport, UpdatePartPayload},
    },
    query::{ColumnKind, ColumnSpec, Join, Scope, ScopeSpec},
};

const PART: Join = Join::BelongsTo { table: "parts", foreign_key: "part_id" };

// ---
// Peças
// ---

pub struct Parts;

#[async_trait]
impl Resource for Parts {
    type Row = Part;
    type Create = CreatePartPayload;
    type Patch = UpdatePartPayload;
    type Export = PartExport;

    const ENTITY: &'static str = "Part";
    const TABLE: &'static str = "parts";
    const SELECT: &'static str = r#"
        t.id, t.part_no, t.name, t.line_id, ln.name AS line_name, ln.plant_id,
        pl.name AS plant_name, t.cycle_time_sec, t.is_active, t.created_at, t.updated_at
    "#;
    const FROM: &'static str = r#"parts t
        JOIN lines ln ON ln.id = t.line_id
        JOIN plants pl ON pl.id = ln.plant_id"#;
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("partNo", ColumnKind::String, "part_no").sortable("t.part_no"),
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("lineName", ColumnKind::String, "name")
            .via(&[LINE])
            .sortable("ln.name"),
        ColumnSpec::new("plantName", ColumnKind::String, "name")
            .via(&[LINE, PLANT])
            .sortable("pl.name"),
        ColumnSpec::new("cycleTimeSec", ColumnKind::Number, "cycle_time_sec").sortable("t.cycle_time_sec"),
        ColumnSpec::new("isActive", ColumnKind::Boolean, "is_active").sortable("t.is_active"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[
        ScopeSpec::new(Scope::Plant, "plantId", "id").via(&[LINE, PLANT]),
        ScopeSpec::new(Scope::Line, "lineId", "id").via(&[LINE]),
        ScopeSpec::new(Scope::Part, "id", "id"),
    ];
    const KEY: Option<BusinessKey> = Some(BusinessKey { column: "part_no", label: "part number" });
    const PAGES: &'static [&'static str] = &["/master/parts", "/master/child-parts", "/production/plans"];

    fn row_id(row: &Part) -> Uuid {
        row.id
    }

    fn create_key(input: &CreatePartPayload) -> Option<&str> {
        Some(&input.part_no)
    }

    fn patch_key(patch: &UpdatePartPayload) -> Option<&str> {
        patch.part_no.as_deref()
    }

    fn diff(current: &Part, patch: UpdatePartPayload) -> UpdatePartPayload {
        UpdatePartPayload {
            part_no: changed(patch.part_no, &current.part_no),
            name: changed(patch.name, &current.name),
            line_id: changed(patch.line_id, &current.line_id),
            cycle_time_sec: changed(patch.cycle_time_sec, &current.cycle_time_sec),
            is_active: changed(patch.is_active, &current.is_active),
        }
    }

    fn is_noop(patch: &UpdatePartPayload) -> bool {
        patch.part_no.is_none()
            && patch.name.is_none()
            && patch.line_id.is_none()
            && patch.cycle_time_sec.is_none()
            && patch.is_active.is_none()
    }

    fn export(row: Part) -> PartExport {
        row.into()
    }

    fn create_parents(input: &CreatePartPayload) -> Vec<(ParentRef, Uuid)> {
        vec![(LINE_PARENT, input.line_id)]
    }

    fn patch_parents(patch: &UpdatePartPayload) -> Vec<(ParentRef, Uuid)> {
        patch.line_id.map(|id| (LINE_PARENT, id)).into_iter().collect()
    }

    async fn insert(conn: &mut PgConnection, input: &CreatePartPayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO parts (id, part_no, name, line_id, cycle_time_sec, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.part_no)
        .bind(&input.name)
        .bind(input.line_id)
        .bind(input.cycle_time_sec)
        .bind(input.is_active)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdatePartPayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("part_no", patch.part_no.clone())
            .set("name", patch.name.clone())
            .set("line_id", patch.line_id)
            .set("cycle_time_sec", patch.cycle_time_sec)
            .set("is_active", patch.is_active)
            .execute(conn, id)
            .await
    }
}

// ---
// Componentes (child parts)
// ---

pub struct ChildParts;

#[async_trait]
impl Resource for ChildParts {
    type Row = ChildPart;
    type Create = CreateChildPartPayload;
    type Patch = UpdateChildPartPayload;
    type Export = ChildPartExport;

    const ENTITY: &'static str = "Child part";
    const TABLE: &'static str = "child_parts";
    const SELECT: &'static str = r#"
        t.id, t.child_part_no, t.name, t.part_id, pa.part_no, pa.name AS part_name,
        pa.line_id, ln.name AS line_name, t.qty_per_part, t.created_at, t.updated_at
    "#;
    const FROM: &'static str = r#"child_parts t
        JOIN parts pa ON pa.id = t.part_id
        JOIN lines ln ON ln.id = pa.line_id"#;
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("childPartNo", ColumnKind::String, "child_part_no").sortable("t.child_part_no"),
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("partNo", ColumnKind::String, "part_no")
            .via(&[PART])
            .sortable("pa.part_no"),
        ColumnSpec::new("partName", ColumnKind::String, "name")
            .via(&[PART])
            .sortable("pa.name"),
        ColumnSpec::new("lineName", ColumnKind::String, "name")
            .via(&[PART, LINE])
            .sortable("ln.name"),
        ColumnSpec::new("qtyPerPart", ColumnKind::Number, "qty_per_part").sortable("t.qty_per_part"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[
        ScopeSpec::new(Scope::Plant, "plantId", "id").via(&[PART, LINE, PLANT]),
        ScopeSpec::new(Scope::Line, "lineId", "id").via(&[PART, LINE]),
        ScopeSpec::new(Scope::Part, "partId", "id").via(&[PART]),
    ];
    const KEY: Option<BusinessKey> =
        Some(BusinessKey { column: "child_part_no", label: "child part number" });
    const PAGES: &'static [&'static str] = &["/master/child-parts"];

    fn row_id(row: &ChildPart) -> Uuid {
        row.id
    }

    fn create_key(input: &CreateChildPartPayload) -> Option<&str> {
        Some(&input.child_part_no)
    }

    fn patch_key(patch: &UpdateChildPartPayload) -> Option<&str> {
        patch.child_part_no.as_deref()
    }

    fn diff(current: &ChildPart, patch: UpdateChildPartPayload) -> UpdateChildPartPayload {
        UpdateChildPartPayload {
            child_part_no: changed(patch.child_part_no, &current.child_part_no),
            name: changed(patch.name, &current.name),
            part_id: changed(patch.part_id, &current.part_id),
            qty_per_part: changed(patch.qty_per_part, &current.qty_per_part),
        }
    }

    fn is_noop(patch: &UpdateChildPartPayload) -> bool {
        patch.child_part_no.is_none()
            && patch.name.is_none()
            && patch.part_id.is_none()
            && patch.qty_per_part.is_none()
    }

    fn export(row: ChildPart) -> ChildPartExport {
        row.into()
    }

    fn create_parents(input: &CreateChildPartPayload) -> Vec<(ParentRef, Uuid)> {
        vec![(PART_PARENT, input.part_id)]
    }

    fn patch_parents(patch: &UpdateChildPartPayload) -> Vec<(ParentRef, Uuid)> {
        patch.part_id.map(|id| (PART_PARENT, id)).into_iter().collect()
    }

    async fn insert(conn: &mut PgConnection, input: &CreateChildPartPayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO child_parts (id, child_part_no, name, part_id, qty_per_part)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.child_part_no)
        .bind(&input.name)
        .bind(input.part_id)
        .bind(input.qty_per_part)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdateChildPartPayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("child_part_no", patch.child_part_no.clone())
            .set("name", patch.name.clone())
            .set("part_id", patch.part_id)
            .set("qty_per_part", patch.qty_per_part)
            .execute(conn, id)
            .await
    }
}
