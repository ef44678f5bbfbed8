// src/common/error.rs

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::common::response::ApiResponse;

// Nosso tipo de erro. Tudo que atravessa a camada de serviço vira uma
// destas variantes, e a resposta HTTP é sempre o envelope `{success, message}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidReference(String),

    #[error("Cannot move production plan from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(first_validation_message(&errors))
    }
}

// Corpo ou query string malformados chegam como erro de validação
// em vez da resposta em texto puro do axum.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            AppError::Duplicate { .. } | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensagem exibida ao usuário. Erros inesperados nunca expõem o texto
    /// original; o detalhe vai só para o log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => {
                tracing::error!("Erro interno: {:?}", self);
                "An unexpected error occurred. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse::<()>::failure(self.user_message());
        (status, body).into_response()
    }
}

/// Primeira mensagem de validação, em ordem alfabética de campo para que o
/// resultado seja estável.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    return err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Field '{field}' is invalid"));
                }
            }
            ValidationErrorsKind::Struct(inner) => return first_validation_message(inner),
            ValidationErrorsKind::List(items) => {
                if let Some(inner) = items.values().next() {
                    return first_validation_message(inner);
                }
            }
        }
    }

    "Invalid input".to_string()
}
