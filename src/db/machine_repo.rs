// src/db/machine_repo.rs

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        line_repo::PLANT,
        resource::{
            BusinessKey, LINE_PARENT, MACHINE_TYPE_PARENT, ParentRef, PartialUpdate, Resource, changed, changed_opt,
        },
    },
    models::machine::{
        CreateMachinePayload, CreateMachineTypePayload, Machine, MachineExport, MachineType,
        MachineTypeExport, UpdateMachinePayload, UpdateMachineTypePayload,
    },
    query::{ColumnKind, ColumnSpec, Join, Scope, ScopeSpec},
};

pub const LINE: Join = Join::BelongsTo { table: "lines", foreign_key: "line_id" };
const MACHINE_TYPE: Join = Join::BelongsTo { table: "machine_types", foreign_key: "machine_type_id" };

// ---
// Tipos de máquina
// ---

pub struct MachineTypes;

#[async_trait]
impl Resource for MachineTypes {
    type Row = MachineType;
    type Create = CreateMachineTypePayload;
    type Patch = UpdateMachineTypePayload;
    type Export = MachineTypeExport;

    const ENTITY: &'static str = "Machine type";
    const TABLE: &'static str = "machine_types";
    const SELECT: &'static str = "t.id, t.name, t.description, t.created_at, t.updated_at";
    const FROM: &'static str = "machine_types t";
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("description", ColumnKind::String, "description").sortable("t.description"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[ScopeSpec::new(Scope::MachineType, "id", "id")];
    const KEY: Option<BusinessKey> = Some(BusinessKey { column: "name", label: "name" });
    const PAGES: &'static [&'static str] = &["/master/machine-types", "/master/machines"];

    fn row_id(row: &MachineType) -> Uuid {
        row.id
    }

    fn create_key(input: &CreateMachineTypePayload) -> Option<&str> {
        Some(&input.name)
    }

    fn patch_key(patch: &UpdateMachineTypePayload) -> Option<&str> {
        patch.name.as_deref()
    }

    fn diff(current: &MachineType, patch: UpdateMachineTypePayload) -> UpdateMachineTypePayload {
        UpdateMachineTypePayload {
            name: changed(patch.name, &current.name),
            description: changed_opt(patch.description, &current.description),
        }
    }

    fn is_noop(patch: &UpdateMachineTypePayload) -> bool {
        patch.name.is_none() && patch.description.is_none()
    }

    fn export(row: MachineType) -> MachineTypeExport {
        row.into()
    }

    async fn insert(conn: &mut PgConnection, input: &CreateMachineTypePayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO machine_types (id, name, description) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdateMachineTypePayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("name", patch.name.clone())
            .set("description", patch.description.clone())
            .execute(conn, id)
            .await
    }
}

// ---
// Máquinas
// ---

pub struct Machines;

#[async_trait]
impl Resource for Machines {
    type Row = Machine;
    type Create = CreateMachinePayload;
    type Patch = UpdateMachinePayload;
    type Export = MachineExport;

    const ENTITY: &'static str = "Machine";
    const TABLE: &'static str = "machines";
    const SELECT: &'static str = r#"
        t.id, t.name, t.line_id, ln.name AS line_name, ln.plant_id, pl.name AS plant_name,
        t.machine_type_id, mt.name AS machine_type_name, t.is_active,
        t.created_at, t.updated_at
    "#;
    const FROM: &'static str = r#"machines t
        JOIN lines ln ON ln.id = t.line_id
        JOIN plants pl ON pl.id = ln.plant_id
        JOIN machine_types mt ON mt.id = t.machine_type_id"#;
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("lineName", ColumnKind::String, "name")
            .via(&[LINE])
            .sortable("ln.name"),
        ColumnSpec::new("plantName", ColumnKind::String, "name")
            .via(&[LINE, PLANT])
            .sortable("pl.name"),
        ColumnSpec::new("machineTypeName", ColumnKind::String, "name")
            .via(&[MACHINE_TYPE])
            .sortable("mt.name"),
        ColumnSpec::new("isActive", ColumnKind::Boolean, "is_active").sortable("t.is_active"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[
        ScopeSpec::new(Scope::Plant, "plantId", "id").via(&[LINE, PLANT]),
        ScopeSpec::new(Scope::Line, "lineId", "id").via(&[LINE]),
        ScopeSpec::new(Scope::MachineType, "machineTypeId", "id").via(&[MACHINE_TYPE]),
    ];
    const KEY: Option<BusinessKey> = Some(BusinessKey { column: "name", label: "name" });
    const PAGES: &'static [&'static str] = &["/master/machines"];

    fn row_id(row: &Machine) -> Uuid {
        row.id
    }

    fn create_key(input: &CreateMachinePayload) -> Option<&str> {
        Some(&input.name)
    }

    fn patch_key(patch: &UpdateMachinePayload) -> Option<&str> {
        patch.name.as_deref()
    }

    fn diff(current: &Machine, patch: UpdateMachinePayload) -> UpdateMachinePayload {
        UpdateMachinePayload {
            name: changed(patch.name, &current.name),
            line_id: changed(patch.line_id, &current.line_id),
            machine_type_id: changed(patch.machine_type_id, &current.machine_type_id),
            is_active: changed(patch.is_active, &current.is_active),
        }
    }

    fn is_noop(patch: &UpdateMachinePayload) -> bool {
        patch.name.is_none()
            && patch.line_id.is_none()
            && patch.machine_type_id.is_none()
            && patch.is_active.is_none()
    }

    fn export(row: Machine) -> MachineExport {
        row.into()
    }

    fn create_parents(input: &CreateMachinePayload) -> Vec<(ParentRef, Uuid)> {
        vec![(LINE_PARENT, input.line_id), (MACHINE_TYPE_PARENT, input.machine_type_id)]
    }

    fn patch_parents(patch: &UpdateMachinePayload) -> Vec<(ParentRef, Uuid)> {
        [
            patch.line_id.map(|id| (LINE_PARENT, id)),
            patch.machine_type_id.map(|id| (MACHINE_TYPE_PARENT, id)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    async fn insert(conn: &mut PgConnection, input: &CreateMachinePayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO machines (id, name, line_id, machine_type_id, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.line_id)
        .bind(input.machine_type_id)
        .bind(input.is_active)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdateMachinePayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("name", patch.name.clone())
            .set("line_id", patch.line_id)
            .set("machine_type_id", patch.machine_type_id)
            .set("is_active", patch.is_active)
            .execute(conn, id)
            .await
    }
}
