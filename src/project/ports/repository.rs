//! Repository ports for project, stage, payment, and task persistence.

use crate::project::domain::{
    PaymentId, PaymentRecord, Project, ProjectId, StageCode, StageRecord, TaskRecord, TaskRecordId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project repository operations.
pub type ProjectRepositoryResult<T> = Result<T, ProjectRepositoryError>;

/// Persistence contract for per-stage progress records.
#[async_trait]
pub trait StageRepository: Send + Sync {
    /// Inserts or replaces the record keyed by its project and stage code.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ProjectNotFound`] when the owning
    /// project does not exist.
    async fn upsert_stage(&self, record: &StageRecord) -> ProjectRepositoryResult<()>;

    /// Finds the record for a given project and stage code.
    ///
    /// Returns `None` when no record has been created for the stage.
    async fn find_stage(
        &self,
        project_id: ProjectId,
        stage_code: StageCode,
    ) -> ProjectRepositoryResult<Option<StageRecord>>;

    /// Returns a project's stage records in catalog order.
    ///
    /// Stages without a record are omitted, not synthesized.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ProjectNotFound`] when the project
    /// does not exist.
    async fn list_stages(&self, project_id: ProjectId)
    -> ProjectRepositoryResult<Vec<StageRecord>>;
}

/// Persistence contract for payment milestone records.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Stores a new payment milestone.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ProjectNotFound`] when the owning
    /// project does not exist.
    async fn store_payment(&self, record: &PaymentRecord) -> ProjectRepositoryResult<()>;

    /// Persists changes to an existing payment milestone.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::PaymentNotFound`] when the payment
    /// does not exist.
    async fn update_payment(&self, record: &PaymentRecord) -> ProjectRepositoryResult<()>;

    /// Finds a payment milestone by identifier.
    ///
    /// Returns `None` when the payment does not exist.
    async fn find_payment(&self, id: PaymentId)
    -> ProjectRepositoryResult<Option<PaymentRecord>>;

    /// Returns all payment milestones owned by a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ProjectNotFound`] when the project
    /// does not exist.
    async fn list_payments(
        &self,
        project_id: ProjectId,
    ) -> ProjectRepositoryResult<Vec<PaymentRecord>>;
}

/// Persistence contract for execution task records.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ProjectNotFound`] when the owning
    /// project does not exist.
    async fn store_task(&self, record: &TaskRecord) -> ProjectRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::TaskNotFound`] when the task does
    /// not exist.
    async fn update_task(&self, record: &TaskRecord) -> ProjectRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskRecordId) -> ProjectRepositoryResult<Option<TaskRecord>>;

    /// Returns all tasks owned by a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ProjectNotFound`] when the project
    /// does not exist.
    async fn list_tasks(&self, project_id: ProjectId) -> ProjectRepositoryResult<Vec<TaskRecord>>;
}

/// Persistence contract for the project aggregate and its owned collections.
///
/// Combining the three child-record contracts behind one object lets the
/// cascade delete span all collections atomically.
#[async_trait]
pub trait ProjectRepository: StageRepository + PaymentRepository + TaskRepository {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::DuplicateProject`] when the project
    /// identifier already exists.
    async fn store_project(&self, project: &Project) -> ProjectRepositoryResult<()>;

    /// Persists changes to an existing project (stage pointer, status,
    /// timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ProjectNotFound`] when the project
    /// does not exist.
    async fn update_project(&self, project: &Project) -> ProjectRepositoryResult<()>;

    /// Finds a project by identifier.
    ///
    /// Returns `None` when the project does not exist.
    async fn find_project(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>>;

    /// Deletes a project and all of its stage, payment, and task records.
    ///
    /// The cascade is all-or-nothing: either every owned record and the
    /// project itself are removed, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ProjectNotFound`] when the project
    /// does not exist.
    async fn delete_project(&self, id: ProjectId) -> ProjectRepositoryResult<()>;
}

/// Errors returned by project repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectRepositoryError {
    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The payment milestone was not found.
    #[error("payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskRecordId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
