// src/query/compiler.rs

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use super::filter::{ColumnKind, ColumnSpec, FilterDescriptor, Scope, ScopeSpec};
use super::predicate::{CmpOp, Predicate, TextMode, Value};

// ---
// Predicado base: soft delete + escopo por ancestral
// ---

/// Monta a parte fixa do WHERE. Ids de escopo que a entidade não declara
/// são ignorados.
pub fn base_predicates(
    soft_delete: bool,
    scopes: &[ScopeSpec],
    requested: &[(Scope, Uuid)],
) -> Vec<Predicate> {
    let mut base = Vec::new();
    if soft_delete {
        base.push(Predicate::not_deleted());
    }

    for (scope, id) in requested {
        match scopes.iter().find(|s| s.scope == *scope) {
            Some(spec) => {
                let leaf = Predicate::Eq {
                    column: spec.column,
                    field: spec.field,
                    value: Value::Id(*id),
                };
                base.push(Predicate::through(spec.path, leaf));
            }
            None => tracing::debug!("Escopo {:?} não se aplica a esta entidade, ignorado", scope),
        }
    }

    base
}

// ---
// Compilador genérico
// ---

/// Converte a lista de descritores num único predicado conjuntivo.
///
/// Colunas fora da allow-list e valores que não convertem para o tipo da
/// coluna são descartados; o restante do predicado segue intacto.
pub fn compile(
    columns: &[ColumnSpec],
    base: Vec<Predicate>,
    filters: &[FilterDescriptor],
) -> Predicate {
    let mut parts = base;

    for filter in filters {
        let Some(spec) = columns.iter().find(|c| c.name == filter.column) else {
            tracing::warn!("Coluna de filtro desconhecida descartada: {}", filter.column);
            continue;
        };

        if !spec.kind.matches(filter.kind) {
            tracing::debug!(
                "Filtro em '{}' declarado como {:?}; usando o tipo da coluna ({:?})",
                spec.name,
                filter.kind,
                spec.kind
            );
        }

        match compile_leaf(spec, filter) {
            Some(leaf) => parts.push(Predicate::through(spec.path, leaf)),
            None => tracing::debug!(
                "Filtro descartado: coluna={} operador={} valor={:?}",
                filter.column,
                filter.operator,
                filter.value
            ),
        }
    }

    Predicate::And(parts)
}

fn compile_leaf(spec: &ColumnSpec, filter: &FilterDescriptor) -> Option<Predicate> {
    let raw = filter.value.trim();
    if raw.is_empty() {
        return None;
    }

    match spec.kind {
        ColumnKind::String => {
            let mode = match filter.operator.as_str() {
                "equals" => TextMode::Equals,
                "startsWith" => TextMode::StartsWith,
                "endsWith" => TextMode::EndsWith,
                _ => TextMode::Contains,
            };
            Some(Predicate::Text {
                column: spec.name,
                field: spec.field,
                mode,
                value: raw.to_string(),
            })
        }
        ColumnKind::Number => {
            let number = raw.parse::<f64>().ok().filter(|n| n.is_finite())?;
            let op = match filter.operator.as_str() {
                "gt" => CmpOp::Gt,
                "gte" => CmpOp::Gte,
                "lt" => CmpOp::Lt,
                "lte" => CmpOp::Lte,
                _ => CmpOp::Eq,
            };
            Some(Predicate::Compare {
                column: spec.name,
                field: spec.field,
                op,
                value: Value::Number(number),
            })
        }
        ColumnKind::Date => {
            let at = parse_date(raw)?;
            let instant = at.with_timezone(&Utc);
            let compare = |op, value| Predicate::Compare {
                column: spec.name,
                field: spec.field,
                op,
                value: Value::Timestamp(value),
            };
            match filter.operator.as_str() {
                "before" => Some(compare(CmpOp::Lt, instant)),
                "after" => Some(compare(CmpOp::Gt, instant)),
                _ => {
                    let (start, end) = day_bounds(at);
                    Some(Predicate::And(vec![
                        compare(CmpOp::Gte, start),
                        compare(CmpOp::Lte, end),
                    ]))
                }
            }
        }
        ColumnKind::Boolean => Some(Predicate::Eq {
            column: spec.name,
            field: spec.field,
            value: Value::Bool(raw.eq_ignore_ascii_case("true")),
        }),
    }
}

/// Aceita RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` e `YYYY-MM-DD`. Sem offset, vale UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).fixed_offset())
}

/// `[00:00:00.000, 23:59:59.999]` do dia civil de `at` no offset em que ele
/// veio, convertido para UTC.
pub fn day_bounds(at: DateTime<FixedOffset>) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = at.date_naive().and_time(NaiveTime::MIN);
    let offset = Duration::seconds(i64::from(at.offset().local_minus_utc()));
    let start = Utc.from_utc_datetime(&(local_midnight - offset));
    (start, start + Duration::milliseconds(86_399_999))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::query::filter::{FilterType, Join};

    const PARTS: Join = Join::BelongsTo { table: "parts", foreign_key: "part_id" };

    const COLUMNS: &[ColumnSpec] = &[
        ColumnSpec::new("name", ColumnKind::String, "name"),
        ColumnSpec::new("qtyPerPart", ColumnKind::Number, "qty_per_part"),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at"),
        ColumnSpec::new("isActive", ColumnKind::Boolean, "is_active"),
        ColumnSpec::new("partNo", ColumnKind::String, "part_no").via(&[PARTS]),
    ];

    fn leaves(p: Predicate) -> Vec<Predicate> {
        match p {
            Predicate::And(parts) => parts,
            other => vec![other],
        }
    }

    fn descriptor(column: &str, op: &str, value: &str, kind: FilterType) -> FilterDescriptor {
        FilterDescriptor::new(column, op, value, kind)
    }

    #[test]
    fn empty_filter_list_is_just_the_base() {
        let base = base_predicates(true, &[], &[]);
        let p = compile(COLUMNS, base, &[]);
        assert_eq!(p, Predicate::And(vec![Predicate::not_deleted()]));
    }

    #[test]
    fn unknown_columns_are_dropped() {
        let filters = [
            descriptor("password_hash", "equals", "x", FilterType::String),
            descriptor("name", "contains", "Line", FilterType::String),
        ];
        let parts = leaves(compile(COLUMNS, vec![], &filters));
        assert_eq!(parts.len(), 1);
        assert!(matches!(&parts[0], Predicate::Text { column: "name", mode: TextMode::Contains, .. }));
    }

    #[test]
    fn string_operator_defaults_to_contains() {
        let filters = [descriptor("name", "weird", "abc", FilterType::String)];
        let parts = leaves(compile(COLUMNS, vec![], &filters));
        assert!(matches!(&parts[0], Predicate::Text { mode: TextMode::Contains, .. }));
    }

    #[test]
    fn invalid_number_and_date_are_dropped_without_affecting_the_rest() {
        let filters = [
            descriptor("qtyPerPart", "gt", "many", FilterType::Number),
            descriptor("createdAt", "before", "yesterday-ish", FilterType::Date),
            descriptor("qtyPerPart", "lte", "4", FilterType::Number),
        ];
        let parts = leaves(compile(COLUMNS, vec![Predicate::not_deleted()], &filters));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], Predicate::not_deleted());
        assert_eq!(
            parts[1],
            Predicate::Compare {
                column: "qtyPerPart",
                field: "qty_per_part",
                op: CmpOp::Lte,
                value: Value::Number(4.0),
            }
        );
    }

    #[test]
    fn date_equals_expands_to_the_whole_day() {
        let filters = [descriptor("createdAt", "equals", "2026-03-14T15:09:26Z", FilterType::Date)];
        let parts = leaves(compile(COLUMNS, vec![], &filters));
        let Predicate::And(range) = &parts[0] else {
            panic!("esperava um intervalo");
        };
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        let end = start + Duration::milliseconds(86_399_999);
        assert_eq!(
            range[0],
            Predicate::Compare { column: "createdAt", field: "created_at", op: CmpOp::Gte, value: Value::Timestamp(start) }
        );
        assert_eq!(
            range[1],
            Predicate::Compare { column: "createdAt", field: "created_at", op: CmpOp::Lte, value: Value::Timestamp(end) }
        );
    }

    #[test]
    fn date_equals_uses_the_calendar_day_of_the_given_offset() {
        // 02:00 em +07:00 ainda é 30/04 em UTC, mas o dia pedido é 01/05
        let at = parse_date("2026-05-01T02:00:00+07:00").unwrap();
        let (start, end) = day_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 4, 30, 17, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 5, 1, 16, 59, 59).unwrap() + Duration::milliseconds(999));

        let west = day_bounds(parse_date("2026-05-01T22:00:00-03:00").unwrap());
        assert_eq!(west.0, Utc.with_ymd_and_hms(2026, 5, 1, 3, 0, 0).unwrap());
    }

    #[test]
    fn before_and_after_compare_the_exact_instant() {
        let filters = [descriptor("createdAt", "before", "2026-05-01T02:00:00+07:00", FilterType::Date)];
        let parts = leaves(compile(COLUMNS, vec![], &filters));
        let expected = Utc.with_ymd_and_hms(2026, 4, 30, 19, 0, 0).unwrap();
        assert_matches!(
            &parts[0],
            Predicate::Compare { op: CmpOp::Lt, value: Value::Timestamp(at), .. } if *at == expected
        );
    }

    #[test]
    fn before_and_after_are_strict() {
        let filters = [
            descriptor("createdAt", "before", "2026-01-02", FilterType::Date),
            descriptor("createdAt", "after", "2026-01-01", FilterType::Date),
        ];
        let parts = leaves(compile(COLUMNS, vec![], &filters));
        assert!(matches!(&parts[0], Predicate::Compare { op: CmpOp::Lt, .. }));
        assert!(matches!(&parts[1], Predicate::Compare { op: CmpOp::Gt, .. }));
    }

    #[test]
    fn boolean_is_case_insensitive_true() {
        let filters = [
            descriptor("isActive", "equals", "TRUE", FilterType::Boolean),
            descriptor("isActive", "equals", "yes", FilterType::Boolean),
        ];
        let parts = leaves(compile(COLUMNS, vec![], &filters));
        assert!(matches!(&parts[0], Predicate::Eq { value: Value::Bool(true), .. }));
        assert!(matches!(&parts[1], Predicate::Eq { value: Value::Bool(false), .. }));
    }

    #[test]
    fn relational_column_compiles_to_nested_predicate() {
        let filters = [descriptor("partNo", "startsWith", "P-10", FilterType::String)];
        let parts = leaves(compile(COLUMNS, vec![], &filters));
        match &parts[0] {
            Predicate::Related { join, inner } => {
                assert_eq!(*join, PARTS);
                assert!(matches!(**inner, Predicate::Text { field: "part_no", mode: TextMode::StartsWith, .. }));
            }
            other => panic!("predicado inesperado: {other:?}"),
        }
    }

    #[test]
    fn column_kind_wins_over_descriptor_type() {
        let filters = [descriptor("qtyPerPart", "gte", "2", FilterType::String)];
        let parts = leaves(compile(COLUMNS, vec![], &filters));
        assert!(matches!(&parts[0], Predicate::Compare { op: CmpOp::Gte, value: Value::Number(_), .. }));
    }

    #[test]
    fn scopes_follow_the_declared_path() {
        const LINES: Join = Join::BelongsTo { table: "lines", foreign_key: "line_id" };
        const SCOPES: &[ScopeSpec] = &[
            ScopeSpec::new(Scope::Line, "lineId", "line_id"),
            ScopeSpec::new(Scope::Plant, "plantId", "plant_id").via(&[LINES]),
        ];
        let plant = Uuid::new_v4();
        let base = base_predicates(false, SCOPES, &[(Scope::Plant, plant), (Scope::Part, Uuid::nil())]);
        assert_eq!(base.len(), 1);
        assert_eq!(
            base[0],
            Predicate::Related {
                join: LINES,
                inner: Box::new(Predicate::Eq { column: "plantId", field: "plant_id", value: Value::Id(plant) }),
            }
        );
    }

    #[test]
    fn parse_date_accepts_common_shapes() {
        assert!(parse_date("2026-05-01").is_some());
        assert!(parse_date("2026-05-01T08:30").is_some());
        assert!(parse_date("2026-05-01T08:30:00+07:00").is_some());
        assert!(parse_date("01/05/2026").is_none());
    }
}
