// src/db.rs

pub mod resource;
pub mod repository;
pub use repository::{PgRepository, Repository};

pub mod downtime_repo;
pub mod line_repo;
pub mod machine_repo;
pub mod part_repo;
pub mod plan_repo;
pub mod plant_repo;
pub mod report_repo;
pub mod shift_repo;
pub mod user_repo;

pub use downtime_repo::{DowntimeCategories, Downtimes};
pub use line_repo::Lines;
pub use machine_repo::{MachineTypes, Machines};
pub use part_repo::{ChildParts, Parts};
pub use plan_repo::{PlanRepository, ProductionPlans};
pub use plant_repo::Plants;
pub use report_repo::ReportRepository;
pub use shift_repo::Shifts;
pub use user_repo::Users;

#[cfg(test)]
pub mod memory;
