// src/services.rs

pub mod crud;
pub mod import;
pub mod production_plan;
pub mod report;

pub use crud::{CrudService, PageConfig};
pub use production_plan::PlanService;
pub use report::ReportService;
