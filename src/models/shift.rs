// src/models/shift.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{export_time, export_timestamp, not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    #[schema(example = "Shift 1")]
    pub name: String,
    pub line_id: Uuid,
    pub line_name: String,
    #[schema(value_type = String, example = "07:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "15:00:00")]
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    pub fn duration_minutes(&self) -> i64 {
        shift_minutes(self.start_time, self.end_time)
    }
}

/// Duração do turno em minutos. Fim antes do início indica turno que
/// atravessa a meia-noite.
pub fn shift_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let minutes = (end - start).num_minutes();
    if minutes <= 0 { minutes + 24 * 60 } else { minutes }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShiftPayload {
    #[validate(
        length(min = 1, max = 50, message = "Shift name must be between 1 and 50 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    pub line_id: Uuid,
    #[schema(value_type = String, example = "07:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "15:00:00")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShiftPayload {
    #[validate(
        length(min = 1, max = 50, message = "Shift name must be between 1 and 50 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    pub line_id: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftExport {
    pub name: String,
    pub line_name: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Shift> for ShiftExport {
    fn from(shift: Shift) -> Self {
        Self {
            duration_minutes: shift.duration_minutes(),
            start_time: export_time(&shift.start_time),
            end_time: export_time(&shift.end_time),
            created_at: export_timestamp(&shift.created_at),
            updated_at: export_timestamp(&shift.updated_at),
            name: shift.name,
            line_name: shift.line_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn day_shift_duration() {
        assert_eq!(shift_minutes(hm(7, 0), hm(15, 0)), 480);
    }

    #[test]
    fn overnight_shift_wraps_midnight() {
        assert_eq!(shift_minutes(hm(23, 0), hm(7, 0)), 480);
        assert_eq!(shift_minutes(hm(22, 30), hm(6, 0)), 450);
    }

    #[test]
    fn equal_bounds_mean_full_day() {
        assert_eq!(shift_minutes(hm(6, 0), hm(6, 0)), 1440);
    }
}
