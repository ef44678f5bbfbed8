// src/query.rs

// Construtor de consultas genérico: descritores de filtro -> predicado SQL,
// ordenação e paginação. Compartilhado por todas as entidades.
pub mod compiler;
pub mod filter;
pub mod pagination;
pub mod predicate;

#[cfg(test)]
pub mod eval;

pub use compiler::{base_predicates, compile};
pub use filter::{ColumnKind, ColumnSpec, FilterDescriptor, FilterType, Join, Scope, ScopeSpec};
pub use pagination::{ListQuery, PageWindow, Paginated, Pagination, SortOrder, SortSpec};
pub use predicate::{CmpOp, Predicate, TextMode, Value};
