//! Infrastructure layer: settings, row storage with its Postgres and
//! in-memory backends, and the services that orchestrate the domain crates
//! over it.

pub mod config;
pub mod db;
pub mod services;
mod tables;

pub use config::Settings;
pub use db::{Database, InMemoryDatabase, PostgresDatabase};
pub use services::{FixSummary, Problem, ServiceError, ServiceResult, Services};
