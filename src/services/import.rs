// src/services/import.rs

// Importação de planilhas (as linhas chegam já convertidas em JSON).
// Cada linha passa pelo mesmo caminho de criação do cadastro manual.

use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ChildParts, Lines, MachineTypes, Machines, Parts, Plants, Repository, resource::Resource},
    models::{
        child_part::{ChildPartImportRow, CreateChildPartPayload},
        line::{CreateLinePayload, LineImportRow},
        machine::{CreateMachinePayload, MachineImportRow},
        part::{CreatePartPayload, PartImportRow},
        plant::{CreatePlantPayload, PlantImportRow},
    },
    services::crud::CrudService,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    /// Número da linha na planilha (o cabeçalho é a linha 1).
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub success_count: usize,
    pub failure_count: usize,
    pub errors: Vec<ImportRowError>,
}

/// Processa as linhas em sequência. Uma linha com erro (inclusive de
/// formato) entra no resumo e não desfaz as que já foram gravadas.
pub async fn import_rows<T, F, Fut>(rows: Vec<Value>, mut handle: F) -> Result<ImportSummary, AppError>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<(), AppError>>,
{
    if rows.is_empty() {
        return Err(AppError::ValidationError("The import file has no rows.".into()));
    }

    let mut summary = ImportSummary::default();
    for (index, row) in rows.into_iter().enumerate() {
        let outcome = match serde_json::from_value::<T>(row) {
            Ok(row) => handle(row).await,
            Err(e) => Err(AppError::ValidationError(format!("Invalid row: {e}"))),
        };
        match outcome {
            Ok(()) => summary.success_count += 1,
            Err(err) => {
                summary.failure_count += 1;
                summary.errors.push(ImportRowError { row: index + 2, error: err.user_message() });
            }
        }
    }
    Ok(summary)
}

/// Id de um pai referenciado pelo nome na planilha.
async fn resolve<R, S>(parents: &CrudService<R, S>, label: &str, key: &str) -> Result<Uuid, AppError>
where
    R: Resource,
    S: Repository<R>,
{
    parents
        .id_by_key(key.trim())
        .await?
        .ok_or_else(|| AppError::InvalidReference(format!("{label} '{}' not found", key.trim())))
}

fn finish<R, S>(service: &CrudService<R, S>, summary: ImportSummary) -> ImportSummary
where
    R: Resource,
    S: Repository<R>,
{
    tracing::info!(
        "📥 Importação de {}: {} ok, {} com erro",
        R::ENTITY,
        summary.success_count,
        summary.failure_count
    );
    if summary.success_count > 0 {
        service.publish_changes();
    }
    summary
}

// ---
// Importadores por entidade
// ---

impl<S: Repository<Plants>> CrudService<Plants, S> {
    pub async fn import(&self, rows: Vec<Value>) -> Result<ImportSummary, AppError> {
        let summary = import_rows(rows, |row: PlantImportRow| async move {
            let input = CreatePlantPayload {
                name: row.name,
                description: row.description,
                is_active: row.is_active.unwrap_or(true),
            };
            self.create_row(input).await.map(|_| ())
        })
        .await?;
        Ok(finish(self, summary))
    }
}

impl<S: Repository<Lines>> CrudService<Lines, S> {
    pub async fn import<P>(
        &self,
        rows: Vec<Value>,
        plants: &CrudService<Plants, P>,
    ) -> Result<ImportSummary, AppError>
    where
        P: Repository<Plants>,
    {
        let summary = import_rows(rows, |row: LineImportRow| async move {
            let plant_id = resolve(plants, "Plant", &row.plant_name).await?;
            let input = CreateLinePayload {
                name: row.name,
                plant_id,
                is_active: row.is_active.unwrap_or(true),
            };
            self.create_row(input).await.map(|_| ())
        })
        .await?;
        Ok(finish(self, summary))
    }
}

impl<S: Repository<Machines>> CrudService<Machines, S> {
    pub async fn import<L, T>(
        &self,
        rows: Vec<Value>,
        lines: &CrudService<Lines, L>,
        machine_types: &CrudService<MachineTypes, T>,
    ) -> Result<ImportSummary, AppError>
    where
        L: Repository<Lines>,
        T: Repository<MachineTypes>,
    {
        let summary = import_rows(rows, |row: MachineImportRow| async move {
            let line_id = resolve(lines, "Line", &row.line_name).await?;
            let machine_type_id = resolve(machine_types, "Machine type", &row.machine_type_name).await?;
            let input = CreateMachinePayload {
                name: row.name,
                line_id,
                machine_type_id,
                is_active: row.is_active.unwrap_or(true),
            };
            self.create_row(input).await.map(|_| ())
        })
        .await?;
        Ok(finish(self, summary))
    }
}

impl<S: Repository<Parts>> CrudService<Parts, S> {
    pub async fn import<L>(
        &self,
        rows: Vec<Value>,
        lines: &CrudService<Lines, L>,
    ) -> Result<ImportSummary, AppError>
    where
        L: Repository<Lines>,
    {
        let summary = import_rows(rows, |row: PartImportRow| async move {
            let line_id = resolve(lines, "Line", &row.line_name).await?;
            let input = CreatePartPayload {
                part_no: row.part_no,
                name: row.name,
                line_id,
                cycle_time_sec: row.cycle_time_sec.unwrap_or_default(),
                is_active: true,
            };
            self.create_row(input).await.map(|_| ())
        })
        .await?;
        Ok(finish(self, summary))
    }
}

impl<S: Repository<ChildParts>> CrudService<ChildParts, S> {
    pub async fn import<P>(
        &self,
        rows: Vec<Value>,
        parts: &CrudService<Parts, P>,
    ) -> Result<ImportSummary, AppError>
    where
        P: Repository<Parts>,
    {
        let summary = import_rows(rows, |row: ChildPartImportRow| async move {
            let part_id = resolve(parts, "Part", &row.part_no).await?;
            let input = CreateChildPartPayload {
                child_part_no: row.child_part_no,
                name: row.name,
                part_id,
                qty_per_part: row.qty_per_part.unwrap_or(1),
            };
            self.create_row(input).await.map(|_| ())
        })
        .await?;
        Ok(finish(self, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    use crate::{
        common::revalidate::Revalidator,
        db::memory::{MemoryRepository, MemoryResource},
        services::crud::PageConfig,
    };

    fn crud<R: MemoryResource>(revalidator: &Revalidator) -> CrudService<R, MemoryRepository<R>> {
        CrudService::new(MemoryRepository::default(), revalidator.clone(), PageConfig::default())
    }

    fn plant_row(name: &str) -> Value {
        json!({ "name": name })
    }

    #[tokio::test]
    async fn empty_payload_fails_the_whole_import() {
        let result = import_rows(Vec::new(), |_: PlantImportRow| async { Ok(()) }).await;
        assert_matches!(result, Err(AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn row_numbers_start_after_the_header() {
        let rows = (1..=4).map(|n| json!(n)).collect();
        let summary = import_rows(rows, |n: i64| async move {
            if n % 2 == 0 {
                Err(AppError::ValidationError(format!("bad {n}")))
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 2);
        assert_eq!(summary.errors[0].row, 3);
        assert_eq!(summary.errors[0].error, "bad 2");
        assert_eq!(summary.errors[1].row, 5);
    }

    #[tokio::test]
    async fn failing_rows_do_not_undo_earlier_ones() {
        let revalidator = Revalidator::new(8);
        let plants = crud::<Plants>(&revalidator);
        plants.create(CreatePlantPayload { name: "Plant A".into(), description: None, is_active: true })
            .await
            .unwrap();
        let mut events = revalidator.subscribe();

        let summary = plants
            .import(vec![plant_row("Plant B"), plant_row("Plant A"), plant_row(""), plant_row("Plant C")])
            .await
            .unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 2);
        assert_eq!(summary.errors[0].row, 3);
        assert_eq!(summary.errors[0].error, "Plant with name 'Plant A' already exists");
        assert_eq!(summary.errors[1].row, 4);

        let total = plants.get_all(&Default::default()).await.unwrap().pagination.total;
        assert_eq!(total, 3);

        // Uma única invalidação para o lote inteiro
        assert!(events.try_recv().is_ok());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn lines_resolve_their_plant_by_name() {
        let revalidator = Revalidator::new(8);
        let plants = crud::<Plants>(&revalidator);
        let lines = crud::<Lines>(&revalidator);
        let plant = plants
            .create(CreatePlantPayload { name: "Plant A".into(), description: None, is_active: true })
            .await
            .unwrap();

        let rows = vec![
            json!({ "name": "Line 1", "plantName": "Plant A", "isActive": false }),
            json!({ "name": "Line 2", "plantName": "Plant Z" }),
        ];
        let summary = lines.import(rows, &plants).await.unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.errors[0].row, 3);
        assert_eq!(summary.errors[0].error, "Plant 'Plant Z' not found");

        let page = lines.get_all(&Default::default()).await.unwrap();
        assert_eq!(page.rows[0].plant_id, plant.id);
        assert!(!page.rows[0].is_active);
    }

    #[tokio::test]
    async fn malformed_rows_are_reported_per_row() {
        let revalidator = Revalidator::new(8);
        let plants = crud::<Plants>(&revalidator);

        let rows = vec![json!({ "description": "sem nome" }), plant_row("Plant B")];
        let summary = plants.import(rows).await.unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.errors[0].row, 2);
        assert!(summary.errors[0].error.starts_with("Invalid row:"));
    }

    #[tokio::test]
    async fn import_with_only_failures_publishes_nothing() {
        let revalidator = Revalidator::new(8);
        let plants = crud::<Plants>(&revalidator);
        let mut events = revalidator.subscribe();

        let summary = plants.import(vec![plant_row(" ")]).await.unwrap();
        assert_eq!(summary.failure_count, 1);
        assert!(events.try_recv().is_err());
    }
}
