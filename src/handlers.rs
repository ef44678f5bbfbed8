// src/handlers.rs

pub mod crud;
pub mod events;
pub mod health;
pub mod import;
pub mod production_plan;
pub mod report;
