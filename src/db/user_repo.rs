// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::{error::AppError, password::hash_password},
    db::{
        line_repo::PLANT,
        machine_repo::LINE,
        resource::{
            BusinessKey, DeleteMode, LINE_PARENT, ParentRef, PartialUpdate, Resource, changed, changed_opt,
        },
    },
    models::user::{CreateUserPayload, UpdateUserPayload, User, UserExport},
    query::{ColumnKind, ColumnSpec, Join, Scope, ScopeSpec},
};

const USER_LINES: Join = Join::HasMany { table: "user_lines", back_key: "user_id" };

pub struct Users;

#[async_trait]
impl Resource for Users {
    type Row = User;
    type Create = CreateUserPayload;
    type Patch = UpdateUserPayload;
    type Export = UserExport;

    const ENTITY: &'static str = "User";
    const TABLE: &'static str = "users";
    // password_hash fica de fora de propósito
    const SELECT: &'static str = r#"
        t.id, t.npk, t.name, t.email, t.role, t.is_active,
        COALESCE(
            (SELECT array_agg(ul.line_id ORDER BY ln.name)
             FROM user_lines ul JOIN lines ln ON ln.id = ul.line_id
             WHERE ul.user_id = t.id),
            '{}'::uuid[]
        ) AS line_ids,
        COALESCE(
            (SELECT array_agg(ln.name ORDER BY ln.name)
             FROM user_lines ul JOIN lines ln ON ln.id = ul.line_id
             WHERE ul.user_id = t.id),
            '{}'::text[]
        ) AS line_names,
        t.created_at, t.updated_at
    "#;
    const FROM: &'static str = "users t";
    const COLUMNS: &'static [ColumnSpec] = &[
        ColumnSpec::new("npk", ColumnKind::String, "npk").sortable("t.npk"),
        ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name"),
        ColumnSpec::new("email", ColumnKind::String, "email").sortable("t.email"),
        ColumnSpec::new("role", ColumnKind::String, "role::text").sortable("t.role"),
        ColumnSpec::new("isActive", ColumnKind::Boolean, "is_active").sortable("t.is_active"),
        ColumnSpec::new("lineName", ColumnKind::String, "name").via(&[USER_LINES, LINE]),
        ColumnSpec::new("createdAt", ColumnKind::Date, "created_at").sortable("t.created_at"),
        ColumnSpec::new("updatedAt", ColumnKind::Date, "updated_at").sortable("t.updated_at"),
    ];
    const SCOPES: &'static [ScopeSpec] = &[
        ScopeSpec::new(Scope::Plant, "plantId", "id").via(&[USER_LINES, LINE, PLANT]),
        ScopeSpec::new(Scope::Line, "lineId", "line_id").via(&[USER_LINES]),
    ];
    const KEY: Option<BusinessKey> = Some(BusinessKey { column: "npk", label: "NPK" });
    // Usuário sai de vez; user_lines cai junto por ON DELETE CASCADE.
    const DELETE_MODE: DeleteMode = DeleteMode::Hard;
    const PAGES: &'static [&'static str] = &["/master/users"];

    fn row_id(row: &User) -> Uuid {
        row.id
    }

    fn create_key(input: &CreateUserPayload) -> Option<&str> {
        Some(&input.npk)
    }

    fn patch_key(patch: &UpdateUserPayload) -> Option<&str> {
        patch.npk.as_deref()
    }

    fn diff(current: &User, patch: UpdateUserPayload) -> UpdateUserPayload {
        UpdateUserPayload {
            npk: changed(patch.npk, &current.npk),
            name: changed(patch.name, &current.name),
            email: changed_opt(patch.email, &current.email),
            // Senha não é comparável com o hash: se veio, é troca.
            password: patch.password,
            role: changed(patch.role, &current.role),
            is_active: changed(patch.is_active, &current.is_active),
            line_ids: patch.line_ids.filter(|ids| !same_lines(ids, &current.line_ids)),
            password_hash: None,
        }
    }

    fn is_noop(patch: &UpdateUserPayload) -> bool {
        patch.npk.is_none()
            && patch.name.is_none()
            && patch.email.is_none()
            && patch.password.is_none()
            && patch.role.is_none()
            && patch.is_active.is_none()
            && patch.line_ids.is_none()
    }

    fn export(row: User) -> UserExport {
        row.into()
    }

    fn create_parents(input: &CreateUserPayload) -> Vec<(ParentRef, Uuid)> {
        input.line_ids.iter().map(|id| (LINE_PARENT, *id)).collect()
    }

    fn patch_parents(patch: &UpdateUserPayload) -> Vec<(ParentRef, Uuid)> {
        patch.line_ids.iter().flatten().map(|id| (LINE_PARENT, *id)).collect()
    }

    async fn prepare_create(mut input: CreateUserPayload) -> Result<CreateUserPayload, AppError> {
        input.password_hash = Some(hash_password(&input.password).await?);
        Ok(input)
    }

    async fn prepare_patch(mut patch: UpdateUserPayload) -> Result<UpdateUserPayload, AppError> {
        if let Some(password) = &patch.password {
            patch.password_hash = Some(hash_password(password).await?);
        }
        Ok(patch)
    }

    async fn insert(conn: &mut PgConnection, input: &CreateUserPayload) -> Result<Uuid, AppError> {
        let password_hash = input
            .password_hash
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Senha sem hash no INSERT de usuário"))?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (id, npk, name, email, password_hash, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.npk)
        .bind(&input.name)
        .bind(&input.email)
        .bind(password_hash)
        .bind(input.role)
        .bind(input.is_active)
        .fetch_one(&mut *conn)
        .await?;

        assign_lines(conn, id, &input.line_ids).await?;
        Ok(id)
    }

    async fn update(conn: &mut PgConnection, id: Uuid, patch: &UpdateUserPayload) -> Result<(), AppError> {
        PartialUpdate::new(Self::TABLE)
            .set("npk", patch.npk.clone())
            .set("name", patch.name.clone())
            .set("email", patch.email.clone())
            .set("password_hash", patch.password_hash.clone())
            .set("role", patch.role)
            .set("is_active", patch.is_active)
            .execute(&mut *conn, id)
            .await?;

        if let Some(line_ids) = &patch.line_ids {
            sqlx::query("DELETE FROM user_lines WHERE user_id = $1")
                .bind(id)
                .execute(&mut *conn)
                .await?;
            assign_lines(conn, id, line_ids).await?;
        }
        Ok(())
    }
}

async fn assign_lines(conn: &mut PgConnection, user_id: Uuid, line_ids: &[Uuid]) -> Result<(), AppError> {
    if line_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO user_lines (user_id, line_id)
        SELECT $1, UNNEST($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(line_ids)
    .execute(conn)
    .await?;
    Ok(())
}

/// Compara as atribuições de linha ignorando ordem e repetição.
fn same_lines(new: &[Uuid], current: &[Uuid]) -> bool {
    let mut a = new.to_vec();
    let mut b = current.to_vec();
    a.sort();
    a.dedup();
    b.sort();
    b.dedup();
    a == b
}
