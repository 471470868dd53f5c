//! `PostgreSQL` adapter implementations.

pub mod models;
pub mod repository;
pub mod schema;

pub use repository::{PostgresProjectRepository, ProjectPgPool};
