// src/db/resource.rs

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{Encode, FromRow, PgConnection, Postgres, QueryBuilder, Type, postgres::PgRow};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    query::{ColumnSpec, ScopeSpec},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Marca `deleted_at`; a linha continua na tabela.
    Soft,
    /// Remove a linha de vez.
    Hard,
}

/// Campo legível e único (name, code, npk, partNo).
#[derive(Debug, Clone, Copy)]
pub struct BusinessKey {
    /// Coluna SQL na tabela da entidade.
    pub column: &'static str,
    /// Como o campo aparece na mensagem de conflito.
    pub label: &'static str,
}

/// Tabela pai referenciada por id num payload. A escrita só aceita pais
/// que ainda não foram removidos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub table: &'static str,
    /// Nome usado na mensagem de referência inválida.
    pub entity: &'static str,
}

impl ParentRef {
    pub const fn new(table: &'static str, entity: &'static str) -> Self {
        Self { table, entity }
    }
}

pub const PLANT_PARENT: ParentRef = ParentRef::new("plants", "Plant");
pub const LINE_PARENT: ParentRef = ParentRef::new("lines", "Line");
pub const MACHINE_TYPE_PARENT: ParentRef = ParentRef::new("machine_types", "Machine type");
pub const PART_PARENT: ParentRef = ParentRef::new("parts", "Part");
pub const SHIFT_PARENT: ParentRef = ParentRef::new("shifts", "Shift");
pub const CATEGORY_PARENT: ParentRef = ParentRef::new("downtime_categories", "Downtime category");
pub const PLAN_PARENT: ParentRef = ParentRef::new("production_plans", "Production plan");

/// Descrição de uma entidade cadastral para o repositório e o serviço
/// genéricos: tabela, SELECT achatado, allow-list de colunas, escopos,
/// chave de negócio e o SQL de escrita.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Linha já achatada (com nomes de exibição dos pais) devolvida à UI.
    type Row: for<'r> FromRow<'r, PgRow> + Serialize + Clone + Send + Sync + Unpin + 'static;
    type Create: Validate + DeserializeOwned + Send + Sync + 'static;
    type Patch: Validate + DeserializeOwned + Default + Send + Sync + 'static;
    type Export: Serialize + Send + Sync + 'static;

    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Colunas do SELECT; a tabela principal sempre tem o alias `t`.
    const SELECT: &'static str;
    /// FROM com os JOINs de exibição.
    const FROM: &'static str;
    const COLUMNS: &'static [ColumnSpec];
    const SCOPES: &'static [ScopeSpec] = &[];
    const KEY: Option<BusinessKey> = None;
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;
    /// Telas do painel que precisam recarregar quando a entidade muda.
    const PAGES: &'static [&'static str];

    fn row_id(row: &Self::Row) -> Uuid;

    fn create_key(_input: &Self::Create) -> Option<&str> {
        None
    }

    fn patch_key(_patch: &Self::Patch) -> Option<&str> {
        None
    }

    /// Mantém no patch só os campos que realmente mudam em relação à linha atual.
    fn diff(current: &Self::Row, patch: Self::Patch) -> Self::Patch;

    fn is_noop(patch: &Self::Patch) -> bool;

    fn export(row: Self::Row) -> Self::Export;

    /// Pais citados no payload de criação.
    fn create_parents(_input: &Self::Create) -> Vec<(ParentRef, Uuid)> {
        Vec::new()
    }

    /// Pais citados no patch (já reduzido pelo `diff`).
    fn patch_parents(_patch: &Self::Patch) -> Vec<(ParentRef, Uuid)> {
        Vec::new()
    }

    /// Regras que dependem da linha atual combinada com o patch.
    fn check_patch(_current: &Self::Row, _patch: &Self::Patch) -> Result<(), AppError> {
        Ok(())
    }

    /// Preparo assíncrono antes da escrita (ex.: hash de senha).
    async fn prepare_create(input: Self::Create) -> Result<Self::Create, AppError> {
        Ok(input)
    }

    async fn prepare_patch(patch: Self::Patch) -> Result<Self::Patch, AppError> {
        Ok(patch)
    }

    /// INSERT (dentro da transação aberta pelo repositório). Devolve o id.
    async fn insert(conn: &mut PgConnection, input: &Self::Create) -> Result<Uuid, AppError>;

    /// UPDATE apenas dos campos presentes no patch.
    async fn update(conn: &mut PgConnection, id: Uuid, patch: &Self::Patch) -> Result<(), AppError>;
}

/// Devolve `Some(new)` só quando o valor difere do atual.
pub fn changed<T: PartialEq>(new: Option<T>, current: &T) -> Option<T> {
    new.filter(|value| value != current)
}

/// Mesmo que `changed`, para colunas anuláveis.
pub fn changed_opt<T: PartialEq>(new: Option<T>, current: &Option<T>) -> Option<T> {
    new.filter(|value| current.as_ref() != Some(value))
}

// ---
// UPDATE parcial
// ---

/// Monta `UPDATE <tabela> SET updated_at = NOW(), ...` apenas com os campos
/// presentes no patch.
pub struct PartialUpdate {
    qb: QueryBuilder<'static, Postgres>,
}

impl PartialUpdate {
    pub fn new(table: &str) -> Self {
        Self { qb: QueryBuilder::new(format!("UPDATE {table} SET updated_at = NOW()")) }
    }

    pub fn set<T>(mut self, column: &str, value: Option<T>) -> Self
    where
        T: 'static + Encode<'static, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.qb.push(format!(", {column} = "));
            self.qb.push_bind(value);
        }
        self
    }

    pub async fn execute(mut self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        self.qb.push(" WHERE id = ").push_bind(id);
        self.qb.build().execute(conn).await?;
        Ok(())
    }
}
