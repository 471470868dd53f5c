//! Service-level error composition for project engine operations.

use crate::project::{domain::ProjectDomainError, ports::ProjectRepositoryError};
use thiserror::Error;

/// Service-level errors for project engine operations.
#[derive(Debug, Error)]
pub enum ProjectEngineError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
}

/// Result type for project engine operations.
pub type ProjectEngineResult<T> = Result<T, ProjectEngineError>;
