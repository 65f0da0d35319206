pub mod config;
pub mod error;
pub mod fetch;
pub mod harvester;
pub mod models;
pub mod orchestrator;
