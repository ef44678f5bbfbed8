// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    common::revalidate::Revalidator,
    db::{
        ChildParts, DowntimeCategories, Downtimes, Lines, MachineTypes, Machines, Parts, PgRepository,
        PlanRepository, Plants, ProductionPlans, ReportRepository, Shifts, Users,
    },
    services::{CrudService, PageConfig, PlanService, ReportService},
};

// Quantos eventos de invalidação ficam no buffer por ouvinte
const EVENT_BUFFER: usize = 64;

/// Configuração lida do ambiente (.env incluso).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub paging: PageConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let addr = env::var("APP_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let paging = PageConfig {
            default_limit: parse_var("DEFAULT_PAGE_SIZE", 10)?,
            max_limit: parse_var("MAX_PAGE_SIZE", 100)?,
        };
        if paging.default_limit == 0 || paging.default_limit > paging.max_limit {
            anyhow::bail!("DEFAULT_PAGE_SIZE deve estar entre 1 e MAX_PAGE_SIZE");
        }

        Ok(Self {
            database_url,
            addr,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            paging,
        })
    }
}

/// Variável opcional; presente mas inválida é erro de inicialização.
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub revalidator: Revalidator,

    pub plants: CrudService<Plants>,
    pub lines: CrudService<Lines>,
    pub machine_types: CrudService<MachineTypes>,
    pub machines: CrudService<Machines>,
    pub parts: CrudService<Parts>,
    pub child_parts: CrudService<ChildParts>,
    pub shifts: CrudService<Shifts>,
    pub users: CrudService<Users>,
    pub downtime_categories: CrudService<DowntimeCategories>,
    pub downtimes: CrudService<Downtimes>,
    pub production_plans: CrudService<ProductionPlans>,

    pub plan_service: PlanService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config.paging))
    }

    // --- Monta o gráfico de dependências ---
    fn with_pool(db_pool: PgPool, paging: PageConfig) -> Self {
        let revalidator = Revalidator::new(EVENT_BUFFER);

        macro_rules! crud {
            () => {
                CrudService::new(PgRepository::new(db_pool.clone()), revalidator.clone(), paging)
            };
        }

        let production_plans: CrudService<ProductionPlans> = crud!();
        let plan_service = PlanService::new(production_plans.clone(), PlanRepository::new(db_pool.clone()));
        let report_service = ReportService::new(ReportRepository::new(db_pool.clone()));

        Self {
            plants: crud!(),
            lines: crud!(),
            machine_types: crud!(),
            machines: crud!(),
            parts: crud!(),
            child_parts: crud!(),
            shifts: crud!(),
            users: crud!(),
            downtime_categories: crud!(),
            downtimes: crud!(),
            production_plans,
            plan_service,
            report_service,
            revalidator,
            db_pool,
        }
    }
}

// Cada handler genérico extrai só o serviço de que precisa
macro_rules! from_state {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            impl FromRef<AppState> for $ty {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )*
    };
}

from_state! {
    db_pool: PgPool,
    revalidator: Revalidator,
    plants: CrudService<Plants>,
    lines: CrudService<Lines>,
    machine_types: CrudService<MachineTypes>,
    machines: CrudService<Machines>,
    parts: CrudService<Parts>,
    child_parts: CrudService<ChildParts>,
    shifts: CrudService<Shifts>,
    users: CrudService<Users>,
    downtime_categories: CrudService<DowntimeCategories>,
    downtimes: CrudService<Downtimes>,
    production_plans: CrudService<ProductionPlans>,
    plan_service: PlanService,
    report_service: ReportService,
}
