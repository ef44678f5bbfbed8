// src/db/memory.rs

// Repositório em memória para os testes de serviço. Usa o mesmo predicado
// compilado que vai para o SQL, avaliado linha a linha.

use std::{collections::HashSet, marker::PhantomData, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        downtime_repo::DowntimeCategories,
        line_repo::Lines,
        plan_repo::ProductionPlans,
        plant_repo::Plants,
        repository::Repository,
        resource::{DeleteMode, ParentRef, Resource},
        user_repo::Users,
    },
    models::{
        downtime::DowntimeCategory, line::Line, plant::Plant, production_plan::{PlanStatus, ProductionPlan},
        user::User,
    },
    query::{PageWindow, Predicate, SortOrder, SortSpec, Value, eval::FieldSource, eval::order_values},
};

/// O que falta a um `Resource` para viver sem banco: montar a linha a partir
/// do payload e aplicar o patch.
pub trait MemoryResource: Resource<Row: FieldSource> {
    fn materialize(id: Uuid, input: &Self::Create, now: DateTime<Utc>) -> Self::Row;
    fn merge(row: &mut Self::Row, patch: &Self::Patch, now: DateTime<Utc>);
    fn key_of(row: &Self::Row) -> Option<&str>;
}

struct Stored<T> {
    row: T,
    deleted_at: Option<DateTime<Utc>>,
}

impl<T: FieldSource> FieldSource for Stored<T> {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "deletedAt" => self.deleted_at.map(Value::Timestamp),
            other => self.row.field(other),
        }
    }
}

pub struct MemoryRepository<R: MemoryResource> {
    rows: Mutex<Vec<Stored<R::Row>>>,
    // Pais removidos; qualquer outro id de pai conta como existente
    removed_parents: Mutex<HashSet<Uuid>>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: MemoryResource> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            removed_parents: Mutex::new(HashSet::new()),
            _resource: PhantomData,
        }
    }
}

impl<R: MemoryResource> MemoryRepository<R> {
    /// Linhas gravadas, inclusive as removidas logicamente.
    pub fn stored_len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Simula um pai removido logicamente em outra tabela.
    pub fn remove_parent(&self, id: Uuid) {
        self.removed_parents.lock().unwrap().insert(id);
    }

    fn select(&self, predicate: &Predicate, sort: &SortSpec) -> Vec<R::Row> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<&Stored<R::Row>> = rows.iter().filter(|s| predicate.matches(*s)).collect();
        matched.sort_by(|a, b| {
            let ordering = order_values(a.field(sort.column), b.field(sort.column))
                .then_with(|| R::row_id(&a.row).cmp(&R::row_id(&b.row)));
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        matched.into_iter().map(|s| s.row.clone()).collect()
    }

    fn is_active(stored: &Stored<R::Row>) -> bool {
        stored.deleted_at.is_none()
    }
}

#[async_trait]
impl<R: MemoryResource> Repository<R> for MemoryRepository<R> {
    async fn find_page(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        window: PageWindow,
    ) -> Result<(Vec<R::Row>, i64), AppError> {
        let all = self.select(predicate, sort);
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_all(&self, predicate: &Predicate, sort: &SortSpec) -> Result<Vec<R::Row>, AppError> {
        Ok(self.select(predicate, sort))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R::Row>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|s| Self::is_active(s) && R::row_id(&s.row) == id)
            .map(|s| s.row.clone()))
    }

    async fn key_exists(&self, key: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().any(|s| {
            Self::is_active(s)
                && R::key_of(&s.row) == Some(key)
                && Some(R::row_id(&s.row)) != exclude
        }))
    }

    async fn find_id_by_key(&self, key: &str) -> Result<Option<Uuid>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|s| Self::is_active(s) && R::key_of(&s.row) == Some(key))
            .map(|s| R::row_id(&s.row)))
    }

    async fn parent_exists(&self, _parent: ParentRef, id: Uuid) -> Result<bool, AppError> {
        Ok(!self.removed_parents.lock().unwrap().contains(&id))
    }

    async fn insert(&self, input: &R::Create) -> Result<R::Row, AppError> {
        let row = R::materialize(Uuid::new_v4(), input, Utc::now());
        self.rows.lock().unwrap().push(Stored { row: row.clone(), deleted_at: None });
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: &R::Patch) -> Result<R::Row, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let stored = rows
            .iter_mut()
            .find(|s| Self::is_active(s) && R::row_id(&s.row) == id)
            .ok_or(AppError::NotFound(R::ENTITY))?;
        R::merge(&mut stored.row, patch, Utc::now());
        Ok(stored.row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match R::DELETE_MODE {
            DeleteMode::Soft => match rows.iter_mut().find(|s| Self::is_active(s) && R::row_id(&s.row) == id) {
                Some(stored) => {
                    stored.deleted_at = Some(Utc::now());
                    Ok(true)
                }
                None => Ok(false),
            },
            DeleteMode::Hard => {
                let before = rows.len();
                rows.retain(|s| R::row_id(&s.row) != id);
                Ok(rows.len() < before)
            }
        }
    }
}

fn text(value: &str) -> Option<Value> {
    Some(Value::Text(value.to_string()))
}

fn merge_field<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

// ---
// Plantas
// ---

impl FieldSource for Plant {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Id(self.id)),
            "name" => text(&self.name),
            "description" => self.description.as_deref().and_then(text),
            "isActive" => Some(Value::Bool(self.is_active)),
            "createdAt" => Some(Value::Timestamp(self.created_at)),
            "updatedAt" => Some(Value::Timestamp(self.updated_at)),
            _ => None,
        }
    }
}

impl MemoryResource for Plants {
    fn materialize(id: Uuid, input: &Self::Create, now: DateTime<Utc>) -> Plant {
        Plant {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn merge(row: &mut Plant, patch: &Self::Patch, now: DateTime<Utc>) {
        merge_field(&mut row.name, &patch.name);
        if patch.description.is_some() {
            row.description = patch.description.clone();
        }
        merge_field(&mut row.is_active, &patch.is_active);
        row.updated_at = now;
    }

    fn key_of(row: &Plant) -> Option<&str> {
        Some(&row.name)
    }
}

// ---
// Linhas (o nome da planta fica vazio: não há JOIN aqui)
// ---

impl FieldSource for Line {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Id(self.id)),
            "name" => text(&self.name),
            "plantId" => Some(Value::Id(self.plant_id)),
            "plantName" => text(&self.plant_name),
            "isActive" => Some(Value::Bool(self.is_active)),
            "createdAt" => Some(Value::Timestamp(self.created_at)),
            "updatedAt" => Some(Value::Timestamp(self.updated_at)),
            _ => None,
        }
    }
}

impl MemoryResource for Lines {
    fn materialize(id: Uuid, input: &Self::Create, now: DateTime<Utc>) -> Line {
        Line {
            id,
            name: input.name.clone(),
            plant_id: input.plant_id,
            plant_name: String::new(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn merge(row: &mut Line, patch: &Self::Patch, now: DateTime<Utc>) {
        merge_field(&mut row.name, &patch.name);
        merge_field(&mut row.plant_id, &patch.plant_id);
        merge_field(&mut row.is_active, &patch.is_active);
        row.updated_at = now;
    }

    fn key_of(row: &Line) -> Option<&str> {
        Some(&row.name)
    }
}

// ---
// Categorias de parada
// ---

impl FieldSource for DowntimeCategory {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Id(self.id)),
            "code" => text(&self.code),
            "name" => text(&self.name),
            "kind" => text(self.kind.as_str()),
            "createdAt" => Some(Value::Timestamp(self.created_at)),
            "updatedAt" => Some(Value::Timestamp(self.updated_at)),
            _ => None,
        }
    }
}

impl MemoryResource for DowntimeCategories {
    fn materialize(id: Uuid, input: &Self::Create, now: DateTime<Utc>) -> DowntimeCategory {
        DowntimeCategory {
            id,
            code: input.code.clone(),
            name: input.name.clone(),
            kind: input.kind,
            created_at: now,
            updated_at: now,
        }
    }

    fn merge(row: &mut DowntimeCategory, patch: &Self::Patch, now: DateTime<Utc>) {
        merge_field(&mut row.code, &patch.code);
        merge_field(&mut row.name, &patch.name);
        merge_field(&mut row.kind, &patch.kind);
        row.updated_at = now;
    }

    fn key_of(row: &DowntimeCategory) -> Option<&str> {
        Some(&row.code)
    }
}

// ---
// Usuários (hard delete)
// ---

impl FieldSource for User {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Id(self.id)),
            "npk" => text(&self.npk),
            "name" => text(&self.name),
            "email" => self.email.as_deref().and_then(text),
            "role" => text(self.role.as_str()),
            "isActive" => Some(Value::Bool(self.is_active)),
            "createdAt" => Some(Value::Timestamp(self.created_at)),
            "updatedAt" => Some(Value::Timestamp(self.updated_at)),
            _ => None,
        }
    }
}

impl MemoryResource for Users {
    fn materialize(id: Uuid, input: &Self::Create, now: DateTime<Utc>) -> User {
        User {
            id,
            npk: input.npk.clone(),
            name: input.name.clone(),
            email: input.email.clone(),
            role: input.role,
            is_active: input.is_active,
            line_ids: input.line_ids.clone(),
            line_names: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn merge(row: &mut User, patch: &Self::Patch, now: DateTime<Utc>) {
        merge_field(&mut row.npk, &patch.npk);
        merge_field(&mut row.name, &patch.name);
        if patch.email.is_some() {
            row.email = patch.email.clone();
        }
        merge_field(&mut row.role, &patch.role);
        merge_field(&mut row.is_active, &patch.is_active);
        merge_field(&mut row.line_ids, &patch.line_ids);
        row.updated_at = now;
    }

    fn key_of(row: &User) -> Option<&str> {
        Some(&row.npk)
    }
}

// ---
// Planos de produção (sem JOIN: nomes vazios, turno 00:00)
// ---

impl FieldSource for ProductionPlan {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Id(self.id)),
            "lineId" => Some(Value::Id(self.line_id)),
            "partId" => Some(Value::Id(self.part_id)),
            "shiftId" => Some(Value::Id(self.shift_id)),
            "plannedQty" => Some(Value::Number(self.planned_qty.into())),
            "actualQty" => Some(Value::Number(self.actual_qty.into())),
            "rejectQty" => Some(Value::Number(self.reject_qty.into())),
            "status" => text(self.status.as_str()),
            "createdAt" => Some(Value::Timestamp(self.created_at)),
            "updatedAt" => Some(Value::Timestamp(self.updated_at)),
            _ => None,
        }
    }
}

impl MemoryResource for ProductionPlans {
    fn materialize(id: Uuid, input: &Self::Create, now: DateTime<Utc>) -> ProductionPlan {
        ProductionPlan {
            id,
            plan_date: input.plan_date,
            line_id: input.line_id,
            line_name: String::new(),
            plant_id: Uuid::nil(),
            plant_name: String::new(),
            part_id: input.part_id,
            part_no: String::new(),
            part_name: String::new(),
            shift_id: input.shift_id,
            shift_name: String::new(),
            shift_start: NaiveTime::MIN,
            shift_end: NaiveTime::MIN,
            planned_qty: input.planned_qty,
            actual_qty: 0,
            reject_qty: 0,
            status: PlanStatus::Open,
            started_at: None,
            ended_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn merge(row: &mut ProductionPlan, patch: &Self::Patch, now: DateTime<Utc>) {
        merge_field(&mut row.plan_date, &patch.plan_date);
        merge_field(&mut row.line_id, &patch.line_id);
        merge_field(&mut row.part_id, &patch.part_id);
        merge_field(&mut row.shift_id, &patch.shift_id);
        merge_field(&mut row.planned_qty, &patch.planned_qty);
        merge_field(&mut row.actual_qty, &patch.actual_qty);
        merge_field(&mut row.reject_qty, &patch.reject_qty);
        row.updated_at = now;
    }

    fn key_of(_row: &ProductionPlan) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::plant::CreatePlantPayload,
        query::{ColumnKind, ColumnSpec, FilterDescriptor, FilterType, base_predicates, compile},
    };

    fn plant(name: &str) -> CreatePlantPayload {
        CreatePlantPayload { name: name.into(), description: None, is_active: true }
    }

    #[tokio::test]
    async fn soft_deleted_rows_disappear_from_reads() {
        let repo = MemoryRepository::<Plants>::default();
        let row = repo.insert(&plant("Plant A")).await.unwrap();
        assert!(repo.delete(row.id).await.unwrap());
        assert!(!repo.delete(row.id).await.unwrap());

        let predicate = compile(Plants::COLUMNS, base_predicates(true, &[], &[]), &[]);
        let (rows, total) = repo
            .find_page(&predicate, &SortSpec::DEFAULT, PageWindow { page: 1, limit: 10 })
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
        assert_eq!(repo.stored_len(), 1);
        assert!(repo.find_by_id(row.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sorts_with_the_resolved_column() {
        let repo = MemoryRepository::<Plants>::default();
        for name in ["b", "c", "a"] {
            repo.insert(&plant(name)).await.unwrap();
        }
        let sort = SortSpec::resolve(
            &[ColumnSpec::new("name", ColumnKind::String, "name").sortable("t.name")],
            Some("name"),
            Some(SortOrder::Asc),
        );
        let filters = [FilterDescriptor::new("name", "contains", "", FilterType::String)];
        let predicate = compile(Plants::COLUMNS, vec![], &filters);
        let names: Vec<String> = repo
            .find_all(&predicate, &sort)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
