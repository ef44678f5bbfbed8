// src/services/production_plan.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{PlanRepository, ProductionPlans},
    models::production_plan::{ClosePlanPayload, PlanAction, ProductionPlan},
    services::crud::{CrudService, parse_id},
};

/// Ciclo de vida do plano (start / close / cancel). O CRUD genérico cuida
/// do resto e nunca mexe no status.
#[derive(Clone)]
pub struct PlanService {
    plans: CrudService<ProductionPlans>,
    repo: PlanRepository,
}

impl PlanService {
    pub fn new(plans: CrudService<ProductionPlans>, repo: PlanRepository) -> Self {
        Self { plans, repo }
    }

    pub async fn start(&self, id: &str) -> Result<ProductionPlan, AppError> {
        self.transition(id, PlanAction::Start, ClosePlanPayload::default()).await
    }

    pub async fn close(&self, id: &str, counts: ClosePlanPayload) -> Result<ProductionPlan, AppError> {
        counts.validate()?;
        // Campo omitido vale o que já está gravado; a regra vale para o resultado final
        let current = self.plans.get_by_id(id).await?;
        counts.check_counts(&current)?;
        self.transition(id, PlanAction::Close, counts).await
    }

    pub async fn cancel(&self, id: &str) -> Result<ProductionPlan, AppError> {
        self.transition(id, PlanAction::Cancel, ClosePlanPayload::default()).await
    }

    async fn transition(
        &self,
        id: &str,
        action: PlanAction,
        counts: ClosePlanPayload,
    ) -> Result<ProductionPlan, AppError> {
        let id = parse_id(id)?;
        let current = self
            .repo
            .find_status(id)
            .await?
            .ok_or(AppError::NotFound("Production plan"))?;
        let next = action.apply(current)?;

        if !self.repo.transition(id, current, next, &counts).await? {
            // Outra requisição mudou o status entre a leitura e o UPDATE
            let latest = self
                .repo
                .find_status(id)
                .await?
                .ok_or(AppError::NotFound("Production plan"))?;
            return Err(AppError::InvalidTransition { from: latest.as_str(), to: next.as_str() });
        }

        tracing::info!("🏭 Plano {} passou de {} para {}", id, current.as_str(), next.as_str());
        self.plans.publish_changes();
        self.plans.find(id).await
    }
}
