// src/db/plan_repo.rs

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        line_repo::PLANT,
        machine_repo::LINE,
        resource::{
            LINE_PARENT, PART_PARENT, ParentRef, PartialUpdate, Resource, SHIFT_PARENT, changed,
        },
    },
    models::production_plan::{
        ClosePlanPayload, CreateProductionPlanPayload, PlanStatus, ProductionPlan,
        ProductionPlanExport, UpdateProductionPlanPayload,
    },
    query::{ColumnKind, ColumnSpec, Join, Scope, ScopeSpec},
};

pub const PLAN: Join = Join::BelongsTo { table: "production_plans", foreign_key: "production_plan_id" };
pub const SHIFT: Join = Join::BelongsTo { table: "shifts", foreign_key: "shift_id" };
const PART: Join = Join::BelongsTo { table: "parts", foreign_key: "part_id" };

pub struct ProductionPlans;

#[async_trait]
impl Resource for ProductionPlans {
    type Row = ProductionPlan;
    type Create = CreateProductionPlanPayload;
    type Patch = UpdateProductionPlanPayload;
    type Export = ProductionPlanExport;

    const ENTITY: &'static str = "Production plan";
    const TABLE: &'static str = "production_plans";
    const SELECT: &'static str = r#"
        t.id, t.plan_date, t.line_id, ln.name AS line_name, ln.plant_id, pl.name AS plant_name,
        t.part_id, pa.part_no, pa.name AS part_name, t.shift_id, sh.name AS shift_name,
        sh.start_time AS shift_start, sh.end_time AS shift_end,
        t.planned_qty, t.actual_qty, t.reject_qty, t.status, t.started_at, t.ended_at,
        t.created_at, t.updated_at
    "#;
    const FROM: &'static str = r#"production_plans t
        JOIN lines ln ON ln.id = t.line_id
        JOIN plants pl ON pl.id = ln.plant_id
        JOIN parts pa ON pa.id = t.part_id
        JOIN shifts sh ON sh.id = t.shift_id"#;
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("planDate", ColumnKind::Date, "plan_date").sortable("t.plan_date"),
        ColumnSpec::new("lineName", ColumnKind::String, "name")
            .via(&[LINE])
            .sortable("ln.name"),
        ColumnSpec::new("plantName", ColumnKind::String, "name")
            .via(&[LINE, PLANT])
            .sortable("pl.name"),
        ColumnSpec::new("partNo", ColumnKind::String, "part_no")
            .via(&[PART])
            .sortable("pa.part_no"),
        ColumnSpec::new("partName", ColumnKind::String, "name")
            .via(&[PART])
            .sortable("pa.name"),
        ColumnSpec::new("shiftName", ColumnKind::String, "name")
            .via(&[SHIFT])
            .sortable("sh.name"),
        ColumnSpec::new("plannedQty", ColumnKind::Number, "planned_qty").sortable("t.planned_qty"),
        ColumnSpec::new("actualQty", ColumnKind::Number, "actual_qty").sortable("t.actual_qty"),
        ColumnSpec::new("rejectQty", ColumnKind::Number, "reject_qty").sortable("t.reject_qty"),
        ColumnSpec::new("status", ColumnKind::String, "status::text").sortable("t.status"),
        ColumnSpec::new("startedAt", ColumnKind::Date, "started_at").sortable("t.started_at"),
        ColumnSpec::new("endedAt", ColumnKind::Date, "ended_at").sortable("t.ended_at"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[
        ScopeSpec::new(Scope::Plant, "plantId", "id").via(&[LINE, PLANT]),
        ScopeSpec::new(Scope::Line, "lineId", "id").via(&[LINE]),
        ScopeSpec::new(Scope::Part, "partId", "id").via(&[PART]),
        ScopeSpec::new(Scope::Shift, "shiftId", "id").via(&[SHIFT]),
        ScopeSpec::new(Scope::ProductionPlan, "id", "id"),
    ];
    const PAGES: &'static [&'static str] = &[
        "/production/plans",
        "/reports/oee",
        "/reports/achievement",
        "/dashboard",
    ];

    fn row_id(row: &ProductionPlan) -> Uuid {
        row.id
    }

    fn diff(current: &ProductionPlan, patch: UpdateProductionPlanPayload) -> UpdateProductionPlanPayload {
        UpdateProductionPlanPayload {
            plan_date: changed(patch.plan_date, &current.plan_date),
            line_id: changed(patch.line_id, &current.line_id),
            part_id: changed(patch.part_id, &current.part_id),
            shift_id: changed(patch.shift_id, &current.shift_id),
            planned_qty: changed(patch.planned_qty, &current.planned_qty),
            actual_qty: changed(patch.actual_qty, &current.actual_qty),
            reject_qty: changed(patch.reject_qty, &current.reject_qty),
        }
    }

    fn is_noop(patch: &UpdateProductionPlanPayload) -> bool {
        patch.plan_date.is_none()
            && patch.line_id.is_none()
            && patch.part_id.is_none()
            && patch.shift_id.is_none()
            && patch.planned_qty.is_none()
            && patch.actual_qty.is_none()
            && patch.reject_qty.is_none()
    }

    fn export(row: ProductionPlan) -> ProductionPlanExport {
        row.into()
    }

    fn create_parents(input: &CreateProductionPlanPayload) -> Vec<(ParentRef, Uuid)> {
        vec![
            (LINE_PARENT, input.line_id),
            (PART_PARENT, input.part_id),
            (SHIFT_PARENT, input.shift_id),
        ]
    }

    fn patch_parents(patch: &UpdateProductionPlanPayload) -> Vec<(ParentRef, Uuid)> {
        [
            patch.line_id.map(|id| (LINE_PARENT, id)),
            patch.part_id.map(|id| (PART_PARENT, id)),
            patch.shift_id.map(|id| (SHIFT_PARENT, id)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn check_patch(current: &ProductionPlan, patch: &UpdateProductionPlanPayload) -> Result<(), AppError> {
        patch.check_counts(current)
    }

    async fn insert(conn: &mut PgConnection, input: &CreateProductionPlanPayload) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO production_plans (id, plan_date, line_id, part_id, shift_id, planned_qty)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.plan_date)
        .bind(input.line_id)
        .bind(input.part_id)
        .bind(input.shift_id)
        .bind(input.planned_qty)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        patch: &UpdateProductionPlanPayload,
    ) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("plan_date", patch.plan_date)
            .set("line_id", patch.line_id)
            .set("part_id", patch.part_id)
            .set("shift_id", patch.shift_id)
            .set("planned_qty", patch.planned_qty)
            .set("actual_qty", patch.actual_qty)
            .set("reject_qty", patch.reject_qty)
            .execute(conn, id)
            .await
    }
}

// ---
// Ciclo de vida (start / close / cancel)
// ---

#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_status(&self, id: Uuid) -> Result<Option<PlanStatus>, AppError> {
        let status = sqlx::query_scalar::<_, PlanStatus>(
            "SELECT status FROM production_plans WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(status)
    }

    /// Aplica a transição só se o status atual ainda for `from`.
    /// `false` quando outra requisição mudou o plano antes.
    pub async fn transition(
        &self,
        id: Uuid,
        from: PlanStatus,
        to: PlanStatus,
        counts: &ClosePlanPayload,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE production_plans SET
                status = $3,
                started_at = CASE WHEN $3 = 'RUNNING'::plan_status THEN NOW() ELSE started_at END,
                ended_at = CASE WHEN $3 IN ('CLOSED'::plan_status, 'CANCELED'::plan_status)
                                THEN NOW() ELSE ended_at END,
                actual_qty = COALESCE($4, actual_qty),
                reject_qty = COALESCE($5, reject_qty),
                updated_at = NOW()
            WHERE id = $1 AND status = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(counts.actual_qty)
        .bind(counts.reject_qty)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_check_violation() {
                    return AppError::ValidationError("Reject quantity cannot exceed actual quantity.".into());
                }
            }
            AppError::from(e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}
