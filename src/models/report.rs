// src/models/report.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::downtime::DowntimeKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Hour,
    Line,
}

// Parâmetros comuns aos relatórios (intervalo inclusivo de datas de plano).
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    #[param(value_type = String, example = "2026-03-01")]
    #[schema(value_type = String)]
    pub from: NaiveDate,
    #[param(value_type = String, example = "2026-03-31")]
    #[schema(value_type = String)]
    pub to: NaiveDate,
    pub plant_id: Option<Uuid>,
    pub line_id: Option<Uuid>,
    #[serde(default)]
    pub group_by: GroupBy,
}

// --- Linhas cruas vindas do banco ---

/// Somatórios de um balde (dia, hora ou linha).
#[derive(Debug, Clone, Default, FromRow)]
pub struct MetricAggregate {
    pub bucket: String,
    pub planned_qty: i64,
    pub actual_qty: i64,
    pub reject_qty: i64,
    pub planned_minutes: i64,
    pub unplanned_minutes: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DowntimeAggregate {
    pub category_code: String,
    pub category_name: String,
    pub kind: DowntimeKind,
    pub minutes: i64,
    pub occurrences: i64,
}

// --- Respostas ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OeeEntry {
    #[schema(example = "2026-03-14")]
    pub bucket: String,
    pub planned_qty: i64,
    pub actual_qty: i64,
    pub reject_qty: i64,
    pub planned_minutes: i64,
    pub downtime_minutes: i64,
    #[schema(value_type = f64)]
    pub availability: Decimal,
    #[schema(value_type = f64)]
    pub performance: Decimal,
    #[schema(value_type = f64)]
    pub quality: Decimal,
    #[schema(value_type = f64, example = 72.35)]
    pub oee: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AchievementEntry {
    pub bucket: String,
    pub planned_qty: i64,
    pub actual_qty: i64,
    #[schema(value_type = f64, example = 98.5)]
    pub achievement: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParetoEntry {
    pub category_code: String,
    pub category_name: String,
    pub kind: DowntimeKind,
    pub minutes: i64,
    pub occurrences: i64,
    /// Participação da categoria no total de minutos (%).
    #[schema(value_type = f64)]
    pub share: Decimal,
    /// Percentual acumulado até esta categoria.
    #[schema(value_type = f64)]
    pub cumulative: Decimal,
}
