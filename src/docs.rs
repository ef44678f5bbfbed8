// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::query;
use crate::services;

// As rotas genéricas de cadastro (GET/POST /api/<entidade>, GET /export,
// GET/PATCH/DELETE /{id}) não têm `#[utoipa::path]`; os payloads e linhas de
// cada entidade entram só como schemas.
#[derive(OpenApi)]
#[openapi(
    info(title = "Manufacturing Admin API", description = "Cadastros, plano de produção e relatórios da fábrica"),
    paths(
        // --- Health / Events ---
        handlers::health::health,
        handlers::events::stream_events,

        // --- Import ---
        handlers::import::import_plants,
        handlers::import::import_lines,
        handlers::import::import_machines,
        handlers::import::import_parts,
        handlers::import::import_child_parts,

        // --- Production plans ---
        handlers::production_plan::start_plan,
        handlers::production_plan::close_plan,
        handlers::production_plan::cancel_plan,

        // --- Reports ---
        handlers::report::get_oee,
        handlers::report::get_achievement,
        handlers::report::get_downtime_pareto,
    ),
    components(
        schemas(
            // --- Query ---
            query::FilterDescriptor,
            query::FilterType,
            query::Pagination,

            // --- Plants / Lines ---
            models::plant::Plant,
            models::plant::CreatePlantPayload,
            models::plant::UpdatePlantPayload,
            models::plant::PlantImportRow,
            models::plant::PlantExport,
            models::line::Line,
            models::line::CreateLinePayload,
            models::line::UpdateLinePayload,
            models::line::LineImportRow,
            models::line::LineExport,

            // --- Machines ---
            models::machine::MachineType,
            models::machine::CreateMachineTypePayload,
            models::machine::UpdateMachineTypePayload,
            models::machine::MachineTypeExport,
            models::machine::Machine,
            models::machine::CreateMachinePayload,
            models::machine::UpdateMachinePayload,
            models::machine::MachineImportRow,
            models::machine::MachineExport,

            // --- Parts ---
            models::part::Part,
            models::part::CreatePartPayload,
            models::part::UpdatePartPayload,
            models::part::PartImportRow,
            models::part::PartExport,
            models::child_part::ChildPart,
            models::child_part::CreateChildPartPayload,
            models::child_part::UpdateChildPartPayload,
            models::child_part::ChildPartImportRow,
            models::child_part::ChildPartExport,

            // --- Shifts / Users ---
            models::shift::Shift,
            models::shift::CreateShiftPayload,
            models::shift::UpdateShiftPayload,
            models::shift::ShiftExport,
            models::user::UserRole,
            models::user::User,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,
            models::user::UserExport,

            // --- Downtime ---
            models::downtime::DowntimeKind,
            models::downtime::DowntimeCategory,
            models::downtime::CreateDowntimeCategoryPayload,
            models::downtime::UpdateDowntimeCategoryPayload,
            models::downtime::DowntimeCategoryExport,
            models::downtime::Downtime,
            models::downtime::CreateDowntimePayload,
            models::downtime::UpdateDowntimePayload,
            models::downtime::DowntimeExport,

            // --- Production plans ---
            models::production_plan::PlanStatus,
            models::production_plan::ProductionPlan,
            models::production_plan::CreateProductionPlanPayload,
            models::production_plan::UpdateProductionPlanPayload,
            models::production_plan::ClosePlanPayload,
            models::production_plan::ProductionPlanExport,

            // --- Reports ---
            models::report::GroupBy,
            models::report::OeeEntry,
            models::report::AchievementEntry,
            models::report::ParetoEntry,

            // --- Import / Health ---
            services::import::ImportSummary,
            services::import::ImportRowError,
            handlers::health::HealthStatus,
        )
    ),
    tags(
        (name = "Health", description = "Estado do serviço"),
        (name = "Events", description = "Invalidação de telas (SSE)"),
        (name = "Import", description = "Importação de planilhas de cadastro"),
        (name = "Production plans", description = "Ciclo de vida do plano de produção"),
        (name = "Reports", description = "OEE, atingimento e pareto de paradas")
    )
)]
pub struct ApiDoc;
