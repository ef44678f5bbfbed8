// src/services/report.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::report::{
        AchievementEntry, DowntimeAggregate, MetricAggregate, OeeEntry, ParetoEntry, ReportQuery,
    },
};

// Intervalo máximo aceito num relatório (em dias)
const MAX_RANGE_DAYS: i64 = 366;

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    pub async fn oee(&self, query: &ReportQuery) -> Result<Vec<OeeEntry>, AppError> {
        validate_range(query)?;
        let totals = self.repo.production_totals(query).await?;
        Ok(totals.into_iter().map(oee_entry).collect())
    }

    pub async fn achievement(&self, query: &ReportQuery) -> Result<Vec<AchievementEntry>, AppError> {
        validate_range(query)?;
        let totals = self.repo.production_totals(query).await?;
        Ok(totals.into_iter().map(achievement_entry).collect())
    }

    pub async fn downtime_pareto(&self, query: &ReportQuery) -> Result<Vec<ParetoEntry>, AppError> {
        validate_range(query)?;
        let rows = self.repo.downtime_by_category(query).await?;
        Ok(pareto(rows))
    }
}

fn validate_range(query: &ReportQuery) -> Result<(), AppError> {
    if query.from > query.to {
        return Err(AppError::ValidationError("'from' must not be after 'to'.".into()));
    }
    if (query.to - query.from).num_days() > MAX_RANGE_DAYS {
        return Err(AppError::ValidationError(format!(
            "Report range cannot exceed {MAX_RANGE_DAYS} days."
        )));
    }
    Ok(())
}

// ---
// Métricas (funções puras)
// ---

/// num / den, com divisão por zero valendo 0.
fn ratio(num: i64, den: i64) -> Decimal {
    if den <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(num) / Decimal::from(den)
}

fn percent(ratio: Decimal) -> Decimal {
    (ratio * Decimal::ONE_HUNDRED).round_dp(2)
}

pub fn oee_entry(agg: MetricAggregate) -> OeeEntry {
    let availability = ratio(agg.planned_minutes - agg.unplanned_minutes, agg.planned_minutes)
        .clamp(Decimal::ZERO, Decimal::ONE);
    let performance = ratio(agg.actual_qty, agg.planned_qty);
    let quality = ratio(agg.actual_qty - agg.reject_qty, agg.actual_qty).max(Decimal::ZERO);
    let oee = availability * performance * quality;

    OeeEntry {
        availability: percent(availability),
        performance: percent(performance),
        quality: percent(quality),
        oee: percent(oee),
        downtime_minutes: agg.unplanned_minutes,
        bucket: agg.bucket,
        planned_qty: agg.planned_qty,
        actual_qty: agg.actual_qty,
        reject_qty: agg.reject_qty,
        planned_minutes: agg.planned_minutes,
    }
}

pub fn achievement_entry(agg: MetricAggregate) -> AchievementEntry {
    AchievementEntry {
        achievement: percent(ratio(agg.actual_qty, agg.planned_qty)),
        bucket: agg.bucket,
        planned_qty: agg.planned_qty,
        actual_qty: agg.actual_qty,
    }
}

/// Ordena por minutos (desc) e acrescenta participação e acumulado.
pub fn pareto(mut rows: Vec<DowntimeAggregate>) -> Vec<ParetoEntry> {
    rows.sort_by(|a, b| b.minutes.cmp(&a.minutes).then_with(|| a.category_code.cmp(&b.category_code)));
    let total: i64 = rows.iter().map(|r| r.minutes).sum();

    let mut running = 0;
    rows.into_iter()
        .map(|row| {
            running += row.minutes;
            ParetoEntry {
                share: percent(ratio(row.minutes, total)),
                cumulative: percent(ratio(running, total)),
                category_code: row.category_code,
                category_name: row.category_name,
                kind: row.kind,
                minutes: row.minutes,
                occurrences: row.occurrences,
            }
        })
        .collect()
}
