// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{default_true, export_timestamp, not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Supervisor,
    Operator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Supervisor => "SUPERVISOR",
            UserRole::Operator => "OPERATOR",
        }
    }
}

// Usuário do painel. O hash da senha nunca entra no SELECT.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "10023")]
    pub npk: String,
    pub name: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    /// Linhas atribuídas (tabela user_lines).
    pub line_ids: Vec<Uuid>,
    pub line_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(
        length(min = 1, max = 20, message = "NPK must be between 1 and 20 characters."),
        custom(function = "not_blank")
    )]
    pub npk: String,
    #[validate(
        length(min = 1, max = 100, message = "User name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub line_ids: Vec<Uuid>,
    /// Preenchido pelo serviço antes do INSERT.
    #[serde(skip)]
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(
        length(min = 1, max = 20, message = "NPK must be between 1 and 20 characters."),
        custom(function = "not_blank")
    )]
    pub npk: Option<String>,
    #[validate(
        length(min = 1, max = 100, message = "User name must be between 1 and 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub line_ids: Option<Vec<Uuid>>,
    #[serde(skip)]
    pub password_hash: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserExport {
    pub npk: String,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
    /// Nomes das linhas separados por vírgula.
    pub lines: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserExport {
    fn from(user: User) -> Self {
        Self {
            role: user.role.as_str().to_string(),
            lines: user.line_names.join(", "),
            created_at: export_timestamp(&user.created_at),
            updated_at: export_timestamp(&user.updated_at),
            npk: user.npk,
            name: user.name,
            email: user.email,
            is_active: user.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_read_from_json() {
        let payload: CreateUserPayload = serde_json::from_value(serde_json::json!({
            "npk": "10023",
            "name": "Ana",
            "password": "secret1",
            "role": "OPERATOR",
            "passwordHash": "forged"
        }))
        .unwrap();
        assert!(payload.password_hash.is_none());
        assert!(payload.is_active);
        assert!(payload.line_ids.is_empty());
    }

    #[test]
    fn short_password_fails_validation() {
        let payload = CreateUserPayload {
            npk: "1".into(),
            name: "Ana".into(),
            email: None,
            password: "123".into(),
            role: UserRole::Admin,
            is_active: true,
            line_ids: vec![],
            password_hash: None,
        };
        assert!(payload.validate().is_err());
    }
}
