pub mod child_part;
pub mod downtime;
pub mod line;
pub mod machine;
pub mod part;
pub mod plant;
pub mod production_plan;
pub mod report;
pub mod shift;
pub mod user;
pub mod validation;
