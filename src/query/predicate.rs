// src/query/predicate.rs

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::filter::Join;

/// Valor já coerido para o tipo da coluna.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
    Bool(bool),
    Id(Uuid),
}

impl Value {
    fn push_bind(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self.clone() {
            Value::Text(v) => qb.push_bind(v),
            Value::Number(v) => qb.push_bind(v),
            Value::Timestamp(v) => qb.push_bind(v),
            Value::Bool(v) => qb.push_bind(v),
            Value::Id(v) => qb.push_bind(v),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    fn sql(self) -> &'static str {
        match self {
            CmpOp::Eq => " = ",
            CmpOp::Gt => " > ",
            CmpOp::Gte => " >= ",
            CmpOp::Lt => " < ",
            CmpOp::Lte => " <= ",
        }
    }
}

/// Predicado composto, independente do banco até a renderização.
///
/// Cada folha guarda o nome público da coluna (`column`) e o campo SQL
/// (`field`); `Related` desloca a folha interna para a tabela relacionada.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    IsNull {
        column: &'static str,
        field: &'static str,
    },
    Eq {
        column: &'static str,
        field: &'static str,
        value: Value,
    },
    Text {
        column: &'static str,
        field: &'static str,
        mode: TextMode,
        value: String,
    },
    Compare {
        column: &'static str,
        field: &'static str,
        op: CmpOp,
        value: Value,
    },
    Related {
        join: Join,
        inner: Box<Predicate>,
    },
}

impl Predicate {
    /// Marcador de soft delete (`deleted_at IS NULL`).
    pub fn not_deleted() -> Self {
        Predicate::IsNull { column: "deletedAt", field: "deleted_at" }
    }

    /// Embrulha a folha no caminho relacional, do ancestral mais próximo
    /// para o mais distante.
    pub fn through(path: &[Join], leaf: Predicate) -> Self {
        path.iter().rev().fold(leaf, |inner, join| Predicate::Related {
            join: *join,
            inner: Box::new(inner),
        })
    }

    /// Escreve o predicado no builder. Valores sempre vão como bind.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>, alias: &str) {
        self.push_at(qb, alias, 0);
    }

    fn push_at(&self, qb: &mut QueryBuilder<'_, Postgres>, alias: &str, depth: usize) {
        match self {
            Predicate::And(parts) if parts.is_empty() => {
                qb.push("TRUE");
            }
            Predicate::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        qb.push(" AND ");
                    }
                    qb.push("(");
                    part.push_at(qb, alias, depth);
                    qb.push(")");
                }
            }
            Predicate::IsNull { field, .. } => {
                qb.push(format!("{alias}.{field} IS NULL"));
            }
            Predicate::Eq { field, value, .. } => {
                qb.push(format!("{alias}.{field} = "));
                value.push_bind(qb);
            }
            Predicate::Text { field, mode, value, .. } => {
                match mode {
                    TextMode::Equals => {
                        qb.push(format!("{alias}.{field} = "));
                        qb.push_bind(value.clone());
                    }
                    TextMode::Contains => {
                        qb.push(format!("{alias}.{field} ILIKE "));
                        qb.push_bind(format!("%{}%", escape_like(value)));
                    }
                    TextMode::StartsWith => {
                        qb.push(format!("{alias}.{field} ILIKE "));
                        qb.push_bind(format!("{}%", escape_like(value)));
                    }
                    TextMode::EndsWith => {
                        qb.push(format!("{alias}.{field} ILIKE "));
                        qb.push_bind(format!("%{}", escape_like(value)));
                    }
                };
            }
            Predicate::Compare { field, op, value, .. } => {
                qb.push(format!("{alias}.{field}{}", op.sql()));
                value.push_bind(qb);
            }
            Predicate::Related { join, inner } => {
                let related = format!("r{}", depth + 1);
                match join {
                    Join::BelongsTo { table, foreign_key } => {
                        qb.push(format!(
                            "EXISTS (SELECT 1 FROM {table} {related} WHERE {related}.id = {alias}.{foreign_key} AND "
                        ));
                    }
                    Join::HasMany { table, back_key } => {
                        qb.push(format!(
                            "EXISTS (SELECT 1 FROM {table} {related} WHERE {related}.{back_key} = {alias}.id AND "
                        ));
                    }
                }
                inner.push_at(qb, &related, depth + 1);
                qb.push(")");
            }
        }
    }
}

/// Escapa os curingas do LIKE (`\` é o escape padrão do Postgres).
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
