//src/main.rs

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod query;
mod services;

use crate::{
    config::{AppState, Config},
    db::{
        ChildParts, DowntimeCategories, Downtimes, Lines, MachineTypes, Machines, Parts, Plants,
        ProductionPlans, Shifts, Users,
    },
    handlers::{crud::resource_routes, import, production_plan, report},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state);

    let listener = TcpListener::bind(&config.addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(app_state: AppState) -> Router {
    // `/import` é estático e tem prioridade sobre o `/{id}` de cada entidade
    let plant_routes = resource_routes::<Plants>().route("/import", post(import::import_plants));
    let line_routes = resource_routes::<Lines>().route("/import", post(import::import_lines));
    let machine_routes = resource_routes::<Machines>().route("/import", post(import::import_machines));
    let part_routes = resource_routes::<Parts>().route("/import", post(import::import_parts));
    let child_part_routes =
        resource_routes::<ChildParts>().route("/import", post(import::import_child_parts));

    let plan_routes = resource_routes::<ProductionPlans>()
        .route("/{id}/start", post(production_plan::start_plan))
        .route("/{id}/close", post(production_plan::close_plan))
        .route("/{id}/cancel", post(production_plan::cancel_plan));

    let report_routes = Router::new()
        .route("/oee", get(report::get_oee))
        .route("/achievement", get(report::get_achievement))
        .route("/downtime-pareto", get(report::get_downtime_pareto));

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/events", get(handlers::events::stream_events))
        .nest("/api/plants", plant_routes)
        .nest("/api/lines", line_routes)
        .nest("/api/machine-types", resource_routes::<MachineTypes>())
        .nest("/api/machines", machine_routes)
        .nest("/api/parts", part_routes)
        .nest("/api/child-parts", child_part_routes)
        .nest("/api/shifts", resource_routes::<Shifts>())
        .nest("/api/users", resource_routes::<Users>())
        .nest("/api/downtime-categories", resource_routes::<DowntimeCategories>())
        .nest("/api/downtimes", resource_routes::<Downtimes>())
        .nest("/api/production-plans", plan_routes)
        .nest("/api/reports", report_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state)
}
