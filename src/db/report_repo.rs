// src/db/report_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::report::{DowntimeAggregate, GroupBy, MetricAggregate, ReportQuery},
};

// Minutos do turno, considerando turnos que passam da meia-noite.
const SHIFT_MINUTES: &str = r#"
    CASE WHEN sh.end_time > sh.start_time
         THEN EXTRACT(EPOCH FROM (sh.end_time - sh.start_time)) / 60
         ELSE EXTRACT(EPOCH FROM (sh.end_time - sh.start_time)) / 60 + 1440
    END"#;

fn bucket_expr(group_by: GroupBy) -> &'static str {
    match group_by {
        GroupBy::Day => "to_char(pp.plan_date, 'YYYY-MM-DD')",
        GroupBy::Hour => {
            "to_char(COALESCE(pp.started_at, pp.plan_date + sh.start_time), 'YYYY-MM-DD HH24:00')"
        }
        GroupBy::Line => "ln.name",
    }
}

/// Planos que entram nos relatórios: ativos, não cancelados, no intervalo.
fn push_plan_filter(qb: &mut QueryBuilder<'_, Postgres>, query: &ReportQuery) {
    qb.push(" WHERE pp.deleted_at IS NULL AND pp.status <> 'CANCELED'::plan_status");
    qb.push(" AND pp.plan_date >= ").push_bind(query.from);
    qb.push(" AND pp.plan_date <= ").push_bind(query.to);
    if let Some(plant_id) = query.plant_id {
        qb.push(" AND ln.plant_id = ").push_bind(plant_id);
    }
    if let Some(line_id) = query.line_id {
        qb.push(" AND pp.line_id = ").push_bind(line_id);
    }
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Somatórios de produção e parada não planejada por balde
    pub async fn production_totals(&self, query: &ReportQuery) -> Result<Vec<MetricAggregate>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            r#"
            SELECT
                {bucket} AS bucket,
                COALESCE(SUM(pp.planned_qty), 0)::BIGINT AS planned_qty,
                COALESCE(SUM(pp.actual_qty), 0)::BIGINT AS actual_qty,
                COALESCE(SUM(pp.reject_qty), 0)::BIGINT AS reject_qty,
                COALESCE(SUM({minutes}), 0)::BIGINT AS planned_minutes,
                COALESCE(SUM(dt.minutes), 0)::BIGINT AS unplanned_minutes
            FROM production_plans pp
            JOIN lines ln ON ln.id = pp.line_id
            JOIN shifts sh ON sh.id = pp.shift_id
            LEFT JOIN LATERAL (
                SELECT SUM(d.duration_minutes) AS minutes
                FROM downtimes d
                JOIN downtime_categories dc ON dc.id = d.category_id
                WHERE d.production_plan_id = pp.id
                  AND d.deleted_at IS NULL
                  AND dc.kind = 'UNPLANNED'::downtime_kind
            ) dt ON TRUE
            "#,
            bucket = bucket_expr(query.group_by),
            minutes = SHIFT_MINUTES,
        ));
        push_plan_filter(&mut qb, query);
        qb.push(" GROUP BY 1 ORDER BY 1");

        let rows = qb
            .build_query_as::<MetricAggregate>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // Minutos e ocorrências por categoria, do maior para o menor
    pub async fn downtime_by_category(&self, query: &ReportQuery) -> Result<Vec<DowntimeAggregate>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                dc.code AS category_code,
                dc.name AS category_name,
                dc.kind,
                COALESCE(SUM(d.duration_minutes), 0)::BIGINT AS minutes,
                COUNT(*)::BIGINT AS occurrences
            FROM downtimes d
            JOIN downtime_categories dc ON dc.id = d.category_id
            JOIN production_plans pp ON pp.id = d.production_plan_id
            JOIN lines ln ON ln.id = pp.line_id
            "#,
        );
        push_plan_filter(&mut qb, query);
        qb.push(" AND d.deleted_at IS NULL");
        qb.push(" GROUP BY dc.id, dc.code, dc.name, dc.kind ORDER BY minutes DESC, dc.code ASC");

        let rows = qb
            .build_query_as::<DowntimeAggregate>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
