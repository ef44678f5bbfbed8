// src/db/repository.rs

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::resource::{DeleteMode, ParentRef, Resource},
    query::{PageWindow, Predicate, SortSpec},
};

/// Acesso a dados de uma entidade. A implementação de produção é
/// `PgRepository`; os testes usam um repositório em memória.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync + 'static {
    async fn find_page(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        window: PageWindow,
    ) -> Result<(Vec<R::Row>, i64), AppError>;

    async fn find_all(&self, predicate: &Predicate, sort: &SortSpec) -> Result<Vec<R::Row>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R::Row>, AppError>;

    /// Existe outra linha ativa com esta chave de negócio?
    async fn key_exists(&self, key: &str, exclude: Option<Uuid>) -> Result<bool, AppError>;

    async fn find_id_by_key(&self, key: &str) -> Result<Option<Uuid>, AppError>;

    /// O pai existe e não foi removido?
    async fn parent_exists(&self, parent: ParentRef, id: Uuid) -> Result<bool, AppError>;

    async fn insert(&self, input: &R::Create) -> Result<R::Row, AppError>;

    async fn update(&self, id: Uuid, patch: &R::Patch) -> Result<R::Row, AppError>;

    /// Soft ou hard delete, conforme `R::DELETE_MODE`. `false` se nada mudou.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

// ---
// Implementação Postgres
// ---

pub struct PgRepository<R> {
    pool: PgPool,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for PgRepository<R> {
    fn clone(&self) -> Self {
        Self { pool: self.pool.clone(), _resource: PhantomData }
    }
}

impl<R: Resource> PgRepository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _resource: PhantomData }
    }

    fn select(predicate: &Predicate, sort: &SortSpec) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM {} WHERE ", R::SELECT, R::FROM));
        predicate.push_sql(&mut qb, "t");
        qb.push(sort.order_by());
        qb
    }

    fn active_clause() -> &'static str {
        match R::DELETE_MODE {
            DeleteMode::Soft => " AND t.deleted_at IS NULL",
            DeleteMode::Hard => "",
        }
    }

    /// Traduz violações de constraint em erros de negócio. A checagem de
    /// unicidade do serviço vem antes; aqui só sobra a corrida entre duas escritas.
    fn map_write_error(err: AppError, key: Option<&str>) -> AppError {
        if let AppError::DatabaseError(sqlx::Error::Database(db_err)) = &err {
            if db_err.is_foreign_key_violation() {
                return AppError::InvalidReference(format!(
                    "{} references a record that does not exist",
                    R::ENTITY
                ));
            }
            if db_err.is_check_violation() {
                return AppError::ValidationError(format!("{} has values outside the allowed range.", R::ENTITY));
            }
            if db_err.is_unique_violation() {
                if let (Some(business_key), Some(value)) = (R::KEY, key) {
                    return AppError::Duplicate {
                        entity: R::ENTITY,
                        field: business_key.label,
                        value: value.to_string(),
                    };
                }
            }
        }
        err
    }
}

#[async_trait]
impl<R: Resource> Repository<R> for PgRepository<R> {
    async fn find_page(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        window: PageWindow,
    ) -> Result<(Vec<R::Row>, i64), AppError> {
        // O COUNT usa exatamente o mesmo FROM + WHERE da página
        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {} WHERE ", R::FROM));
        predicate.push_sql(&mut count, "t");
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = Self::select(predicate, sort);
        qb.push(" LIMIT ").push_bind(i64::from(window.limit));
        qb.push(" OFFSET ").push_bind(window.offset());
        let rows = qb.build_query_as::<R::Row>().fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    async fn find_all(&self, predicate: &Predicate, sort: &SortSpec) -> Result<Vec<R::Row>, AppError> {
        let mut qb = Self::select(predicate, sort);
        let rows = qb.build_query_as::<R::Row>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R::Row>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE t.id = $1{}",
            R::SELECT,
            R::FROM,
            Self::active_clause()
        );
        let row = sqlx::query_as::<_, R::Row>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn key_exists(&self, key: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let Some(business_key) = R::KEY else {
            return Ok(false);
        };

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT EXISTS (SELECT 1 FROM {} t WHERE t.{} = ",
            R::TABLE,
            business_key.column
        ));
        qb.push_bind(key.to_string());
        qb.push(Self::active_clause());
        if let Some(id) = exclude {
            qb.push(" AND t.id <> ").push_bind(id);
        }
        qb.push(")");

        let exists: bool = qb.build_query_scalar::<bool>().fetch_one(&self.pool).await?;
        Ok(exists)
    }

    async fn find_id_by_key(&self, key: &str) -> Result<Option<Uuid>, AppError> {
        let Some(business_key) = R::KEY else {
            return Ok(None);
        };

        let query = format!(
            "SELECT t.id FROM {} t WHERE t.{} = $1{} LIMIT 1",
            R::TABLE,
            business_key.column,
            Self::active_clause()
        );
        let id = sqlx::query_scalar::<_, Uuid>(&query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn parent_exists(&self, parent: ParentRef, id: Uuid) -> Result<bool, AppError> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND deleted_at IS NULL)",
            parent.table
        );
        let exists: bool = sqlx::query_scalar(&query).bind(id).fetch_one(&self.pool).await?;
        Ok(exists)
    }

    async fn insert(&self, input: &R::Create) -> Result<R::Row, AppError> {
        let mut tx = self.pool.begin().await?;
        let id = R::insert(&mut *tx, input)
            .await
            .map_err(|e| Self::map_write_error(e, R::create_key(input)))?;
        tx.commit().await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound(R::ENTITY))
    }

    async fn update(&self, id: Uuid, patch: &R::Patch) -> Result<R::Row, AppError> {
        let mut tx = self.pool.begin().await?;
        R::update(&mut *tx, id, patch)
            .await
            .map_err(|e| Self::map_write_error(e, R::patch_key(patch)))?;
        tx.commit().await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound(R::ENTITY))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let query = match R::DELETE_MODE {
            DeleteMode::Soft => format!(
                "UPDATE {} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
                R::TABLE
            ),
            DeleteMode::Hard => format!("DELETE FROM {} WHERE id = $1", R::TABLE),
        };
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
