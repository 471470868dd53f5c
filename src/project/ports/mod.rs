//! Port contracts for project lifecycle and payment reconciliation.
//!
//! Ports define infrastructure-agnostic interfaces used by project services.

pub mod repository;

pub use repository::{
    PaymentRepository, ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult,
    StageRepository, TaskRepository,
};
