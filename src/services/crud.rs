// src/services/crud.rs

use std::{marker::PhantomData, sync::Arc};

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, revalidate::Revalidator},
    db::{
        PgRepository, Repository,
        resource::{DeleteMode, ParentRef, Resource},
    },
    query::{ListQuery, Paginated, Predicate, SortSpec, base_predicates, compile},
};

/// Limites de paginação vindos da configuração.
#[derive(Debug, Clone, Copy)]
pub struct PageConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self { default_limit: 10, max_limit: 100 }
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::ValidationError(format!("Invalid id format: '{}'", raw)))
}

/// Serviço genérico de cadastro: listagem filtrada, exportação, CRUD com
/// validação, unicidade da chave de negócio e aviso de invalidação.
pub struct CrudService<R: Resource, S = PgRepository<R>> {
    repo: Arc<S>,
    revalidator: Revalidator,
    paging: PageConfig,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource, S> Clone for CrudService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            revalidator: self.revalidator.clone(),
            paging: self.paging,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource, S: Repository<R>> CrudService<R, S> {
    pub fn new(repo: S, revalidator: Revalidator, paging: PageConfig) -> Self {
        Self { repo: Arc::new(repo), revalidator, paging, _resource: PhantomData }
    }

    /// Predicado e ordenação compartilhados por listagem e exportação,
    /// para que a planilha traga exatamente o que a tabela mostra.
    fn criteria(&self, query: &ListQuery) -> (Predicate, SortSpec) {
        let base = base_predicates(R::DELETE_MODE == DeleteMode::Soft, R::SCOPES, &query.scopes());
        let predicate = compile(R::COLUMNS, base, &query.filters);
        (predicate, query.sort(R::COLUMNS))
    }

    // --- GET ALL ---
    pub async fn get_all(&self, query: &ListQuery) -> Result<Paginated<R::Row>, AppError> {
        let (predicate, sort) = self.criteria(query);
        let window = query.window(self.paging.default_limit, self.paging.max_limit);

        let (rows, total) = self.repo.find_page(&predicate, &sort, window).await?;
        Ok(Paginated { rows, pagination: window.pagination(total) })
    }

    // --- EXPORT (todas as páginas, mesmos filtros) ---
    pub async fn export(&self, query: &ListQuery) -> Result<Vec<R::Export>, AppError> {
        let (predicate, sort) = self.criteria(query);
        let rows = self.repo.find_all(&predicate, &sort).await?;
        tracing::info!("📤 Exportando {} linha(s) de {}", rows.len(), R::ENTITY);
        Ok(rows.into_iter().map(R::export).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<R::Row, AppError> {
        self.find(parse_id(id)?).await
    }

    pub(crate) async fn find(&self, id: Uuid) -> Result<R::Row, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound(R::ENTITY))
    }

    // --- CREATE ---
    pub async fn create(&self, input: R::Create) -> Result<R::Row, AppError> {
        let row = self.create_row(input).await?;
        self.publish_changes();
        Ok(row)
    }

    /// Criação sem publicar a invalidação (a importação publica uma vez no fim).
    pub(crate) async fn create_row(&self, input: R::Create) -> Result<R::Row, AppError> {
        input.validate()?;
        if let Some(key) = R::create_key(&input) {
            self.ensure_unique(key, None).await?;
        }
        self.ensure_parents(R::create_parents(&input)).await?;

        let input = R::prepare_create(input).await?;
        let row = self.repo.insert(&input).await?;
        tracing::info!("✅ {} criado: {}", R::ENTITY, R::row_id(&row));
        Ok(row)
    }

    // --- UPDATE (parcial) ---
    pub async fn update(&self, id: &str, patch: R::Patch) -> Result<R::Row, AppError> {
        let id = parse_id(id)?;
        patch.validate()?;

        let current = self.find(id).await?;
        let patch = R::diff(&current, patch);
        if R::is_noop(&patch) {
            tracing::debug!("{} {}: nada mudou, update ignorado", R::ENTITY, id);
            return Ok(current);
        }

        if let Some(key) = R::patch_key(&patch) {
            self.ensure_unique(key, Some(id)).await?;
        }
        R::check_patch(&current, &patch)?;
        self.ensure_parents(R::patch_parents(&patch)).await?;

        let patch = R::prepare_patch(patch).await?;
        let row = self.repo.update(id, &patch).await?;
        tracing::info!("✏️ {} atualizado: {}", R::ENTITY, id);
        self.publish_changes();
        Ok(row)
    }

    // --- DELETE ---
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(id)?;
        self.find(id).await?;

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound(R::ENTITY));
        }
        tracing::info!("🗑️ {} removido: {}", R::ENTITY, id);
        self.publish_changes();
        Ok(())
    }

    /// Resolve um nome de exibição (chave de negócio) para o id.
    pub(crate) async fn id_by_key(&self, key: &str) -> Result<Option<Uuid>, AppError> {
        self.repo.find_id_by_key(key).await
    }

    pub(crate) fn publish_changes(&self) {
        self.revalidator.publish(R::ENTITY, R::PAGES);
    }

    async fn ensure_unique(&self, key: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
        let Some(business_key) = R::KEY else {
            return Ok(());
        };
        if self.repo.key_exists(key, exclude).await? {
            return Err(AppError::Duplicate {
                entity: R::ENTITY,
                field: business_key.label,
                value: key.to_string(),
            });
        }
        Ok(())
    }

    async fn ensure_parents(&self, parents: Vec<(ParentRef, Uuid)>) -> Result<(), AppError> {
        for (parent, id) in parents {
            if !self.repo.parent_exists(parent, id).await? {
                return Err(AppError::InvalidReference(format!("{} '{}' not found", parent.entity, id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::db::memory::MemoryResource;

    use chrono::NaiveDate;

    use crate::{
        db::{Lines, Plants, ProductionPlans, Users, memory::MemoryRepository},
        models::{
            line::{CreateLinePayload, UpdateLinePayload},
            plant::{CreatePlantPayload, UpdatePlantPayload},
            production_plan::{CreateProductionPlanPayload, UpdateProductionPlanPayload},
            user::{CreateUserPayload, UserRole},
        },
        query::{FilterDescriptor, FilterType, SortOrder},
    };

    type PlantService = CrudService<Plants, MemoryRepository<Plants>>;

    fn service() -> (PlantService, Revalidator) {
        let revalidator = Revalidator::new(16);
        let service = CrudService::new(MemoryRepository::default(), revalidator.clone(), PageConfig::default());
        (service, revalidator)
    }

    fn plant(name: &str) -> CreatePlantPayload {
        CreatePlantPayload { name: name.into(), description: None, is_active: true }
    }

    fn memory_service<R: MemoryResource>() -> CrudService<R, MemoryRepository<R>> {
        CrudService::new(MemoryRepository::default(), Revalidator::new(4), PageConfig::default())
    }

    fn line(name: &str, plant_id: Uuid) -> CreateLinePayload {
        CreateLinePayload { name: name.into(), plant_id, is_active: true }
    }

    #[tokio::test]
    async fn create_then_get_by_id() {
        let (service, _) = service();
        let created = service.create(plant("Plant A")).await.unwrap();
        let found = service.get_by_id(&created.id.to_string()).await.unwrap();
        assert_eq!(found.name, "Plant A");
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn duplicate_business_key_is_rejected() {
        let (service, _) = service();
        service.create(plant("Plant A")).await.unwrap();

        let err = service.create(plant("Plant A")).await.unwrap_err();
        assert_matches!(err, AppError::Duplicate { field: "name", .. });
        assert_eq!(err.to_string(), "Plant with name 'Plant A' already exists");

        // Comparação exata: caixa diferente não conflita
        assert!(service.create(plant("plant a")).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_payload_surfaces_first_message() {
        let (service, _) = service();
        let err = service.create(plant("   ")).await.unwrap_err();
        assert_matches!(err, AppError::ValidationError(msg) if msg == "Value must not be blank.");
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let (service, _) = service();
        assert_matches!(service.get_by_id("abc").await, Err(AppError::ValidationError(_)));
        assert_matches!(service.delete("abc").await, Err(AppError::ValidationError(_)));
        assert_matches!(
            service.update("abc", UpdatePlantPayload::default()).await,
            Err(AppError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn update_with_same_values_is_a_noop() {
        let (service, revalidator) = service();
        let created = service.create(plant("Plant A")).await.unwrap();
        let mut events = revalidator.subscribe();

        let patch = UpdatePlantPayload { name: Some("Plant A".into()), is_active: Some(true), ..Default::default() };
        let row = service.update(&created.id.to_string(), patch).await.unwrap();

        assert_eq!(row.updated_at, created.updated_at);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_patch_returns_the_row_untouched() {
        let (service, revalidator) = service();
        let created = service.create(plant("Plant A")).await.unwrap();
        let mut events = revalidator.subscribe();

        let row = service.update(&created.id.to_string(), UpdatePlantPayload::default()).await.unwrap();

        assert_eq!(row.id, created.id);
        assert_eq!(row.name, "Plant A");
        assert_eq!(row.updated_at, created.updated_at);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn update_checks_key_against_other_rows_only() {
        let (service, _) = service();
        let a = service.create(plant("Plant A")).await.unwrap();
        service.create(plant("Plant B")).await.unwrap();

        let rename = |name: &str| UpdatePlantPayload { name: Some(name.into()), ..Default::default() };
        assert_matches!(
            service.update(&a.id.to_string(), rename("Plant B")).await,
            Err(AppError::Duplicate { .. })
        );
        let renamed = service.update(&a.id.to_string(), rename("Plant C")).await.unwrap();
        assert_eq!(renamed.name, "Plant C");
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let (service, _) = service();
        let patch = UpdatePlantPayload { name: Some("X".into()), ..Default::default() };
        assert_matches!(
            service.update(&Uuid::new_v4().to_string(), patch).await,
            Err(AppError::NotFound("Plant"))
        );
    }

    #[tokio::test]
    async fn deleted_rows_leave_lists_and_free_the_key() {
        let (service, revalidator) = service();
        let a = service.create(plant("Plant A")).await.unwrap();
        service.create(plant("Plant B")).await.unwrap();
        let mut events = revalidator.subscribe();

        service.delete(&a.id.to_string()).await.unwrap();
        let event = events.try_recv().unwrap();
        assert_eq!(event.entity, "Plant");
        assert!(event.pages.contains(&"/master/plants"));

        let page = service.get_all(&ListQuery::default()).await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.rows[0].name, "Plant B");

        assert_matches!(service.get_by_id(&a.id.to_string()).await, Err(AppError::NotFound(_)));
        assert_matches!(service.delete(&a.id.to_string()).await, Err(AppError::NotFound(_)));
        assert!(service.create(plant("Plant A")).await.is_ok());
    }

    #[tokio::test]
    async fn second_page_of_fifteen_rows() {
        let (service, _) = service();
        for i in 0..15 {
            service.create(plant(&format!("Plant {i:02}"))).await.unwrap();
        }
        let query = ListQuery {
            page: Some(2),
            limit: Some(10),
            sort_by: Some("name".into()),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let page = service.get_all(&query).await.unwrap();
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.rows[0].name, "Plant 10");
        assert_eq!(page.pagination.total, 15);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn export_matches_every_page_of_the_list() {
        let (service, _) = service();
        for i in 0..12 {
            service.create(plant(&format!("Plant {i:02}"))).await.unwrap();
        }
        service.create(plant("Warehouse")).await.unwrap();

        let mut query = ListQuery {
            limit: Some(5),
            filters: vec![FilterDescriptor::new("name", "startsWith", "plant", FilterType::String)],
            sort_by: Some("name".into()),
            ..Default::default()
        };

        let mut listed = Vec::new();
        for page in 1..=3 {
            query.page = Some(page);
            listed.extend(service.get_all(&query).await.unwrap().rows.into_iter().map(|p| p.name));
        }
        let exported: Vec<String> = service.export(&query).await.unwrap().into_iter().map(|p| p.name).collect();

        assert_eq!(listed.len(), 12);
        assert_eq!(exported, listed);
    }

    #[tokio::test]
    async fn unknown_filter_columns_are_ignored() {
        let (service, _) = service();
        service.create(plant("Plant A")).await.unwrap();
        let query = ListQuery {
            filters: vec![FilterDescriptor::new("password", "equals", "x", FilterType::String)],
            ..Default::default()
        };
        assert_eq!(service.get_all(&query).await.unwrap().pagination.total, 1);
    }

    #[tokio::test]
    async fn line_names_are_unique_across_plants() {
        let service = memory_service::<Lines>();
        let (plant_a, plant_b) = (Uuid::new_v4(), Uuid::new_v4());
        service.create(line("Line 1", plant_a)).await.unwrap();

        assert_matches!(
            service.create(line("Line 1", plant_a)).await,
            Err(AppError::Duplicate { entity: "Line", field: "name", .. })
        );
        assert_matches!(
            service.create(line("Line 1", plant_b)).await,
            Err(AppError::Duplicate { entity: "Line", field: "name", .. })
        );
        assert!(service.create(line("Line 2", plant_b)).await.is_ok());
    }

    #[tokio::test]
    async fn removed_parent_is_refused_on_create_and_update() {
        let service = memory_service::<Lines>();
        let (kept, removed) = (Uuid::new_v4(), Uuid::new_v4());
        service.repo.remove_parent(removed);

        assert_matches!(
            service.create(line("Line 1", removed)).await,
            Err(AppError::InvalidReference(msg)) if msg == format!("Plant '{removed}' not found")
        );
        assert_eq!(service.repo.stored_len(), 0);

        let created = service.create(line("Line 1", kept)).await.unwrap();
        let move_to = UpdateLinePayload { plant_id: Some(removed), ..Default::default() };
        assert_matches!(
            service.update(&created.id.to_string(), move_to).await,
            Err(AppError::InvalidReference(_))
        );
        assert_eq!(service.get_by_id(&created.id.to_string()).await.unwrap().plant_id, kept);
    }

    #[tokio::test]
    async fn plan_patch_checks_reject_against_the_stored_actual() {
        let service = memory_service::<ProductionPlans>();
        let input = CreateProductionPlanPayload {
            plan_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            line_id: Uuid::new_v4(),
            part_id: Uuid::new_v4(),
            shift_id: Uuid::new_v4(),
            planned_qty: 1200,
        };
        let plan = service.create(input).await.unwrap();
        let id = plan.id.to_string();

        let counted = UpdateProductionPlanPayload { actual_qty: Some(100), ..Default::default() };
        service.update(&id, counted).await.unwrap();

        let reject_only = UpdateProductionPlanPayload { reject_qty: Some(500), ..Default::default() };
        assert_matches!(
            service.update(&id, reject_only).await,
            Err(AppError::ValidationError(msg)) if msg == "Reject quantity cannot exceed actual quantity."
        );

        let lowered = UpdateProductionPlanPayload { actual_qty: Some(0), reject_qty: Some(0), ..Default::default() };
        let row = service.update(&id, lowered).await.unwrap();
        assert_eq!((row.actual_qty, row.reject_qty), (0, 0));

        let within = UpdateProductionPlanPayload { actual_qty: Some(600), reject_qty: Some(500), ..Default::default() };
        let row = service.update(&id, within).await.unwrap();
        assert_eq!((row.actual_qty, row.reject_qty), (600, 500));
    }

    #[tokio::test]
    async fn users_are_hard_deleted_and_never_expose_the_hash() {
        let service = memory_service::<Users>();
        let input = CreateUserPayload {
            npk: "10023".into(),
            name: "Ana".into(),
            email: Some("ana@plant.local".into()),
            password: "secret1".into(),
            role: UserRole::Operator,
            is_active: true,
            line_ids: vec![],
            password_hash: None,
        };
        let user = service.create(input).await.unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());

        service.delete(&user.id.to_string()).await.unwrap();
        assert_eq!(service.repo.stored_len(), 0);
    }
}
