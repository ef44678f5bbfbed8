// src/query/filter.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---
// Descritor enviado pela UI (uma condição por coluna)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FilterDescriptor {
    pub column: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub kind: FilterType,
}

impl FilterDescriptor {
    pub fn new(column: &str, operator: &str, value: &str, kind: FilterType) -> Self {
        Self {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
}

/// Tipo declarado de uma coluna na allow-list da entidade.
/// É ele (e não o `type` do descritor) que decide a coerção do valor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Number,
    Date,
    Boolean,
}

impl ColumnKind {
    pub fn matches(self, kind: FilterType) -> bool {
        matches!(
            (self, kind),
            (ColumnKind::String, FilterType::String)
                | (ColumnKind::Number, FilterType::Number)
                | (ColumnKind::Date, FilterType::Date)
                | (ColumnKind::Boolean, FilterType::Boolean)
        )
    }
}

// ---
// Travessia relacional
// ---

/// Um salto na hierarquia de tabelas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Linha pai: `pai.id = filho.foreign_key`.
    BelongsTo {
        table: &'static str,
        foreign_key: &'static str,
    },
    /// Linhas filhas: `filho.back_key = pai.id`.
    HasMany {
        table: &'static str,
        back_key: &'static str,
    },
}

/// Coluna permitida para filtro/ordenação.
///
/// `name` é o nome público (o que a UI manda), `field` é a coluna SQL na
/// última tabela do `path`. Colunas de exibição de outra entidade (ex.:
/// `plantName` numa Line) declaram o caminho relacional até ela.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub field: &'static str,
    pub path: &'static [Join],
    pub sort: Option<&'static str>,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, kind: ColumnKind, field: &'static str) -> Self {
        Self { name, kind, field, path: &[], sort: None }
    }

    pub const fn via(self, path: &'static [Join]) -> Self {
        Self { path, ..self }
    }

    /// Expressão SQL usada no ORDER BY (referencia os aliases do SELECT).
    pub const fn sortable(self, expr: &'static str) -> Self {
        Self { sort: Some(expr), ..self }
    }
}

// ---
// Escopo por ancestral (plantId, lineId, ...)
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Plant,
    Line,
    Part,
    MachineType,
    Shift,
    ProductionPlan,
    Category,
}

#[derive(Debug, Clone, Copy)]
pub struct ScopeSpec {
    pub scope: Scope,
    pub column: &'static str,
    pub field: &'static str,
    pub path: &'static [Join],
}

impl ScopeSpec {
    pub const fn new(scope: Scope, column: &'static str, field: &'static str) -> Self {
        Self { scope, column, field, path: &[] }
    }

    pub const fn via(self, path: &'static [Join]) -> Self {
        Self { path, ..self }
    }
}
