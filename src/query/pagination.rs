// src/query/pagination.rs

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::filter::{ColumnSpec, FilterDescriptor, Scope};

// ---
// Parâmetros de listagem (getAll / export)
// ---

/// O que a tabela da UI manda: página, filtros, ordenação e ids de escopo.
///
/// `filters` aceita tanto um array JSON (corpo da requisição) quanto uma
/// string com o array codificado (query string).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "filters_from_any")]
    pub filters: Vec<FilterDescriptor>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub plant_id: Option<Uuid>,
    pub line_id: Option<Uuid>,
    pub part_id: Option<Uuid>,
    pub machine_type_id: Option<Uuid>,
    pub shift_id: Option<Uuid>,
    pub production_plan_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl ListQuery {
    pub fn scopes(&self) -> Vec<(Scope, Uuid)> {
        [
            (Scope::Plant, self.plant_id),
            (Scope::Line, self.line_id),
            (Scope::Part, self.part_id),
            (Scope::MachineType, self.machine_type_id),
            (Scope::Shift, self.shift_id),
            (Scope::ProductionPlan, self.production_plan_id),
            (Scope::Category, self.category_id),
        ]
        .into_iter()
        .filter_map(|(scope, id)| id.map(|id| (scope, id)))
        .collect()
    }

    /// Página efetiva: `page >= 1`, `limit` entre 1 e `max_limit`.
    pub fn window(&self, default_limit: u32, max_limit: u32) -> PageWindow {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        PageWindow { page, limit }
    }

    pub fn sort(&self, columns: &[ColumnSpec]) -> SortSpec {
        SortSpec::resolve(columns, self.sort_by.as_deref(), self.sort_order)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FiltersInput {
    List(Vec<FilterDescriptor>),
    Encoded(String),
}

fn filters_from_any<'de, D>(deserializer: D) -> Result<Vec<FilterDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FiltersInput>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(FiltersInput::List(list)) => Ok(list),
        Some(FiltersInput::Encoded(raw)) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(FiltersInput::Encoded(raw)) => {
            serde_json::from_str(&raw).map_err(serde::de::Error::custom)
        }
    }
}

// ---
// Janela de paginação
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        let limit = i64::from(self.limit);
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub rows: Vec<T>,
    pub pagination: Pagination,
}

// ---
// Ordenação
// ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub expr: &'static str,
    pub order: SortOrder,
}

impl SortSpec {
    pub const DEFAULT: SortSpec = SortSpec {
        column: "createdAt",
        expr: "t.created_at",
        order: SortOrder::Desc,
    };

    /// `sortBy` desconhecido (ou não ordenável) cai no padrão `createdAt desc`.
    pub fn resolve(columns: &[ColumnSpec], sort_by: Option<&str>, order: Option<SortOrder>) -> Self {
        let Some(sort_by) = sort_by else {
            return Self::DEFAULT;
        };

        match columns.iter().find(|c| c.name == sort_by) {
            Some(&ColumnSpec { name, sort: Some(expr), .. }) => SortSpec {
                column: name,
                expr,
                order: order.unwrap_or_default(),
            },
            _ => {
                tracing::debug!("sortBy '{}' não reconhecido, usando o padrão", sort_by);
                Self::DEFAULT
            }
        }
    }

    /// `ORDER BY` com desempate por id para manter as páginas estáveis.
    pub fn order_by(&self) -> String {
        format!(" ORDER BY {} {}, t.id {}", self.expr, self.order.sql(), self.order.sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::{ColumnKind, FilterType};

    const COLUMNS: &[ColumnSpec] = &[
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("plantName", ColumnKind::String, "name").sortable("p.name"),
        ColumnSpec::new("notes", ColumnKind::String, "notes"),
    ];

    #[test]
    fn second_page_of_fifteen_rows() {
        let query = ListQuery { page: Some(2), limit: Some(10), ..Default::default() };
        let window = query.window(10, 100);
        assert_eq!(window.offset(), 10);
        let pagination = window.pagination(15);
        assert_eq!(pagination.total_pages, 2);
        assert_eq!(pagination.total, 15);
    }

    #[test]
    fn window_is_clamped() {
        let query = ListQuery { page: Some(0), limit: Some(5000), ..Default::default() };
        assert_eq!(query.window(10, 100), PageWindow { page: 1, limit: 100 });

        let query = ListQuery { limit: Some(0), ..Default::default() };
        assert_eq!(query.window(10, 100), PageWindow { page: 1, limit: 1 });

        assert_eq!(ListQuery::default().window(10, 100).limit, 10);
    }

    #[test]
    fn total_pages_of_empty_result_is_zero() {
        let window = PageWindow { page: 1, limit: 10 };
        assert_eq!(window.pagination(0).total_pages, 0);
        assert_eq!(window.pagination(10).total_pages, 1);
        assert_eq!(window.pagination(11).total_pages, 2);
    }

    #[test]
    fn sort_resolves_relation_columns_and_falls_back() {
        let spec = SortSpec::resolve(COLUMNS, Some("plantName"), Some(SortOrder::Desc));
        assert_eq!(spec.expr, "p.name");
        assert_eq!(spec.order, SortOrder::Desc);

        assert_eq!(SortSpec::resolve(COLUMNS, Some("bogus"), Some(SortOrder::Asc)), SortSpec::DEFAULT);
        assert_eq!(SortSpec::resolve(COLUMNS, Some("notes"), None), SortSpec::DEFAULT);
        assert_eq!(SortSpec::resolve(COLUMNS, None, None), SortSpec::DEFAULT);
        assert_eq!(SortSpec::resolve(COLUMNS, Some("name"), None).order, SortOrder::Asc);
    }

    #[test]
    fn filters_accept_array_or_encoded_string() {
        let from_body: ListQuery = serde_json::from_str(
            r#"{"page":1,"filters":[{"column":"name","operator":"contains","value":"A","type":"string"}]}"#,
        )
        .unwrap();
        assert_eq!(from_body.filters.len(), 1);

        let encoded = r#"[{"column":"qty","operator":"gt","value":"3","type":"number"}]"#;
        let from_query: ListQuery =
            serde_json::from_value(serde_json::json!({ "filters": encoded, "sortBy": "name" })).unwrap();
        assert_eq!(from_query.filters[0].kind, FilterType::Number);
        assert_eq!(from_query.sort_by.as_deref(), Some("name"));
    }

    #[test]
    fn scopes_only_include_present_ids() {
        let line = Uuid::new_v4();
        let query = ListQuery { line_id: Some(line), ..Default::default() };
        assert_eq!(query.scopes(), vec![(Scope::Line, line)]);
    }
}
