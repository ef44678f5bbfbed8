// src/models/validation.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use validator::ValidationError;

// ---
// Validações customizadas compartilhadas pelos payloads
// ---

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank.".into());
        return Err(err);
    }
    Ok(())
}

pub fn default_true() -> bool {
    true
}

// ---
// Formatação das colunas de data na exportação
// ---

pub fn export_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}

pub fn export_date(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn export_time(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
