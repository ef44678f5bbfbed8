// src/db/downtime_repo.rs

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        line_repo::PLANT,
        machine_repo::LINE,
        plan_repo::{PLAN, SHIFT},
        resource::{
            BusinessKey, CATEGORY_PARENT, PLAN_PARENT, ParentRef, PartialUpdate, Resource, changed, changed_opt,
        },
    },
    models::downtime::{
        CreateDowntimeCategoryPayload, CreateDowntimePayload, Downtime, DowntimeCategory,
        DowntimeCategoryExport, DowntimeExport, UpdateDowntimeCategoryPayload, UpdateDowntimePayload,
    },
    query::{ColumnKind, ColumnSpec, Join, Scope, ScopeSpec},
};

const CATEGORY: Join = Join::BelongsTo { table: "downtime_categories", foreign_key: "category_id" };

// ---
// Categorias de parada (PLANNED / UNPLANNED)
// ---

pub struct DowntimeCategories;

#[async_trait]
impl Resource for DowntimeCategories {
    type Row = DowntimeCategory;
    type Create = CreateDowntimeCategoryPayload;
    type Patch = UpdateDowntimeCategoryPayload;
    type Export = DowntimeCategoryExport;

    const ENTITY: &'static str = "Downtime category";
    const TABLE: &'static str = "downtime_categories";
    const SELECT: &'static str = "t.id, t.code, t.name, t.kind, t.created_at, t.updated_at";
    const FROM: &'static str = "downtime_categories t";
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("code", ColumnKind::String, "code").sortable("t.code"),
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("kind", ColumnKind::String, "kind::text").sortable("t.kind"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[ScopeSpec::new(Scope::Category, "id", "id")];
    const KEY: Option<BusinessKey> = Some(BusinessKey { column: "code", label: "code" });
    const PAGES: &'static [&'static str] = &["/master/downtime-categories", "/reports/downtime"];

    fn row_id(row: &DowntimeCategory) -> Uuid {
        row.id
    }

    fn create_key(input: &CreateDowntimeCategoryPayload) -> Option<&str> {
        Some(&input.code)
    }

    fn patch_key(patch: &UpdateDowntimeCategoryPayload) -> Option<&str> {
        patch.code.as_deref()
    }

    fn diff(current: &DowntimeCategory, patch: UpdateDowntimeCategoryPayload) -> UpdateDowntimeCategoryPayload {
        UpdateDowntimeCategoryPayload {
            code: changed(patch.code, &current.code),
            name: changed(patch.name, &current.name),
            kind: changed(patch.kind, &current.kind),
        }
    }

    fn is_noop(patch: &UpdateDowntimeCategoryPayload) -> bool {
        patch.code.is_none() && patch.name.is_none() && patch.kind.is_none()
    }

    fn export(row: DowntimeCategory) -> DowntimeCategoryExport {
        row.into()
    }

    async fn insert(conn: &mut PgConnection, input: &CreateDowntimeCategoryPayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO downtime_categories (id, code, name, kind) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.kind)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        patch: &UpdateDowntimeCategoryPayload,
    ) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("code", patch.code.clone())
            .set("name", patch.name.clone())
            .set("kind", patch.kind)
            .execute(conn, id)
            .await
    }
}

// ---
// Paradas lançadas
// ---

pub struct Downtimes;

#[async_trait]
impl Resource for Downtimes {
    type Row = Downtime;
    type Create = CreateDowntimePayload;
    type Patch = UpdateDowntimePayload;
    type Export = DowntimeExport;

    const ENTITY: &'static str = "Downtime";
    const TABLE: &'static str = "downtimes";
    const SELECT: &'static str = r#"
        t.id, t.production_plan_id, pp.plan_date, pp.line_id, ln.name AS line_name,
        sh.name AS shift_name, t.category_id, dc.code AS category_code,
        dc.name AS category_name, dc.kind AS category_kind, t.duration_minutes, t.note,
        t.created_at, t.updated_at
    "#;
    const FROM: &'static str = r#"downtimes t
        JOIN production_plans pp ON pp.id = t.production_plan_id
        JOIN lines ln ON ln.id = pp.line_id
        JOIN shifts sh ON sh.id = pp.shift_id
        JOIN downtime_categories dc ON dc.id = t.category_id"#;
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("planDate", ColumnKind::Date, "plan_date")
            .via(&[PLAN])
            .sortable("pp.plan_date"),
        ColumnSpec::new("lineName", ColumnKind::String, "name")
            .via(&[PLAN, LINE])
            .sortable("ln.name"),
        ColumnSpec::new("shiftName", ColumnKind::String, "name")
            .via(&[PLAN, SHIFT])
            .sortable("sh.name"),
        ColumnSpec::new("categoryCode", ColumnKind::String, "code")
            .via(&[CATEGORY])
            .sortable("dc.code"),
        ColumnSpec::new("categoryName", ColumnKind::String, "name")
            .via(&[CATEGORY])
            .sortable("dc.name"),
        ColumnSpec::new("categoryKind", ColumnKind::String, "kind::text")
            .via(&[CATEGORY])
            .sortable("dc.kind"),
        ColumnSpec::new("durationMinutes", ColumnKind::Number, "duration_minutes")
            .sortable("t.duration_minutes"),
        ColumnSpec::new("note", ColumnKind::String, "note"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[
        ScopeSpec::new(Scope::Plant, "plantId", "id").via(&[PLAN, LINE, PLANT]),
        ScopeSpec::new(Scope::Line, "lineId", "id").via(&[PLAN, LINE]),
        ScopeSpec::new(Scope::Shift, "shiftId", "id").via(&[PLAN, SHIFT]),
        ScopeSpec::new(Scope::ProductionPlan, "productionPlanId", "id").via(&[PLAN]),
        ScopeSpec::new(Scope::Category, "categoryId", "id").via(&[CATEGORY]),
    ];
    const PAGES: &'static [&'static str] = &[
        "/production/downtimes",
        "/reports/oee",
        "/reports/downtime",
    ];

    fn row_id(row: &Downtime) -> Uuid {
        row.id
    }

    fn diff(current: &Downtime, patch: UpdateDowntimePayload) -> UpdateDowntimePayload {
        UpdateDowntimePayload {
            production_plan_id: changed(patch.production_plan_id, &current.production_plan_id),
            category_id: changed(patch.category_id, &current.category_id),
            duration_minutes: changed(patch.duration_minutes, &current.duration_minutes),
            note: changed_opt(patch.note, &current.note),
        }
    }

    fn is_noop(patch: &UpdateDowntimePayload) -> bool {
        patch.production_plan_id.is_none()
            && patch.category_id.is_none()
            && patch.duration_minutes.is_none()
            && patch.note.is_none()
    }

    fn export(row: Downtime) -> DowntimeExport {
        row.into()
    }

    fn create_parents(input: &CreateDowntimePayload) -> Vec<(ParentRef, Uuid)> {
        vec![(PLAN_PARENT, input.production_plan_id), (CATEGORY_PARENT, input.category_id)]
    }

    fn patch_parents(patch: &UpdateDowntimePayload) -> Vec<(ParentRef, Uuid)> {
        [
            patch.production_plan_id.map(|id| (PLAN_PARENT, id)),
            patch.category_id.map(|id| (CATEGORY_PARENT, id)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    async fn insert(conn: &mut PgConnection, input: &CreateDowntimePayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO downtimes (id, production_plan_id, category_id, duration_minutes, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.production_plan_id)
        .bind(input.category_id)
        .bind(input.duration_minutes)
        .bind(&input.note)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdateDowntimePayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("production_plan_id", patch.production_plan_id)
            .set("category_id", patch.category_id)
            .set("duration_minutes", patch.duration_minutes)
            .set("note", patch.note.clone())
            .execute(conn, id)
            .await
    }
}
