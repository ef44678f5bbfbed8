// src/query/eval.rs

// Avaliação do predicado em memória, usada pelo repositório de testes.
// As colunas relacionais já vêm achatadas na linha (ex.: `plantName`),
// então `Related` apenas delega para a folha interna.

use std::cmp::Ordering;

use super::predicate::{CmpOp, Predicate, TextMode, Value};

/// Linha que expõe seus valores pelo nome público da coluna.
pub trait FieldSource {
    fn field(&self, column: &str) -> Option<Value>;
}

impl Predicate {
    pub fn matches<R: FieldSource>(&self, row: &R) -> bool {
        match self {
            Predicate::And(parts) => parts.iter().all(|p| p.matches(row)),
            Predicate::IsNull { column, .. } => row.field(column).is_none(),
            Predicate::Eq { column, value, .. } => row.field(column).as_ref() == Some(value),
            Predicate::Text { column, mode, value, .. } => match row.field(column) {
                Some(Value::Text(actual)) => text_matches(*mode, &actual, value),
                _ => false,
            },
            Predicate::Compare { column, op, value, .. } => {
                let Some(actual) = row.field(column) else {
                    return false;
                };
                match compare(&actual, value) {
                    Some(ordering) => match op {
                        CmpOp::Eq => ordering == Ordering::Equal,
                        CmpOp::Gt => ordering == Ordering::Greater,
                        CmpOp::Gte => ordering != Ordering::Less,
                        CmpOp::Lt => ordering == Ordering::Less,
                        CmpOp::Lte => ordering != Ordering::Greater,
                    },
                    None => false,
                }
            }
            Predicate::Related { inner, .. } => inner.matches(row),
        }
    }
}

fn text_matches(mode: TextMode, actual: &str, expected: &str) -> bool {
    if mode == TextMode::Equals {
        return actual == expected;
    }
    let actual = actual.to_lowercase();
    let expected = expected.to_lowercase();
    match mode {
        TextMode::Contains => actual.contains(&expected),
        TextMode::StartsWith => actual.starts_with(&expected),
        TextMode::EndsWith => actual.ends_with(&expected),
        TextMode::Equals => unreachable!(),
    }
}

fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Comparação usada na ordenação em memória.
pub fn order_values(a: Option<Value>, b: Option<Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(&b),
        (Some(Value::Id(a)), Some(Value::Id(b))) => a.cmp(&b),
        (Some(a), Some(b)) => compare(&a, &b).unwrap_or(Ordering::Equal),
    }
}
