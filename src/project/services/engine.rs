//! Project engine composition root.
//!
//! The engine binds one stage tracker, one payment ledger, and one task
//! board to a shared repository, clock, and per-project lock registry, and
//! exposes the aggregate commands and the composed read model consumed by
//! collaborators.

use super::error::ProjectEngineResult;
use super::locks::ProjectLockRegistry;
use super::payment_ledger::PaymentLedger;
use super::stage_tracker::StageTracker;
use super::task_board::TaskBoard;
use crate::project::{
    domain::{
        Money, PaymentTotals, Project, ProjectId, ProjectName, ProjectStatus, ProjectSummary,
        StageCode, TaskCounts,
    },
    ports::{ProjectRepository, ProjectRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    name: String,
    total_value_minor_units: i64,
    category: Option<String>,
    property_details: Option<String>,
}

impl CreateProjectRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, total_value_minor_units: i64) -> Self {
        Self {
            name: name.into(),
            total_value_minor_units,
            category: None,
            property_details: None,
        }
    }

    /// Sets the project category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the property details.
    #[must_use]
    pub fn with_property_details(mut self, property_details: impl Into<String>) -> Self {
        self.property_details = Some(property_details.into());
        self
    }
}

/// Project engine composition root.
#[derive(Clone)]
pub struct ProjectEngine<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    locks: Arc<ProjectLockRegistry>,
    stages: StageTracker<R, C>,
    payments: PaymentLedger<R, C>,
    tasks: TaskBoard<R, C>,
}

impl<R, C> ProjectEngine<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new engine over a repository and clock.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        let locks = Arc::new(ProjectLockRegistry::new());
        Self {
            stages: StageTracker::new(
                Arc::clone(&repository),
                Arc::clone(&clock),
                Arc::clone(&locks),
            ),
            payments: PaymentLedger::new(
                Arc::clone(&repository),
                Arc::clone(&clock),
                Arc::clone(&locks),
            ),
            tasks: TaskBoard::new(
                Arc::clone(&repository),
                Arc::clone(&clock),
                Arc::clone(&locks),
            ),
            repository,
            clock,
            locks,
        }
    }

    /// Returns the stage tracker bound to this engine.
    #[must_use]
    pub const fn stages(&self) -> &StageTracker<R, C> {
        &self.stages
    }

    /// Returns the payment ledger bound to this engine.
    #[must_use]
    pub const fn payments(&self) -> &PaymentLedger<R, C> {
        &self.payments
    }

    /// Returns the task board bound to this engine.
    #[must_use]
    pub const fn tasks(&self) -> &TaskBoard<R, C> {
        &self.tasks
    }

    /// Creates a new active project at the lead stage.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Domain`] when the name is blank
    /// or the contract value negative, and
    /// [`super::ProjectEngineError::Repository`] when persistence fails.
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> ProjectEngineResult<Project> {
        let name = ProjectName::new(request.name)?;
        let total_value = Money::new(request.total_value_minor_units)?;

        let mut project = Project::new(name, total_value, &*self.clock);
        if let Some(category) = request.category {
            project = project.with_category(category);
        }
        if let Some(property_details) = request.property_details {
            project = project.with_property_details(property_details);
        }
        self.repository.store_project(&project).await?;
        debug!(project_id = %project.id(), "project created at lead stage");
        Ok(project)
    }

    /// Retrieves a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn find_project(&self, project_id: ProjectId) -> ProjectEngineResult<Project> {
        self.require_project(project_id).await
    }

    /// Moves the project's stage pointer.
    ///
    /// No monotonicity is enforced; a backward move is accepted and logged
    /// as an anomaly.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn advance_stage(
        &self,
        project_id: ProjectId,
        stage: StageCode,
    ) -> ProjectEngineResult<Project> {
        let _guard = self.locks.acquire(project_id).await;
        let mut project = self.require_project(project_id).await?;

        if stage.ordinal() < project.current_stage().ordinal() {
            warn!(
                project_id = %project_id,
                from = %project.current_stage(),
                to = %stage,
                "stage pointer moved backward"
            );
        }
        project.advance_stage(stage, &*self.clock);
        self.repository.update_project(&project).await?;
        debug!(project_id = %project_id, stage = %stage, "stage pointer advanced");
        Ok(project)
    }

    /// Returns the project's reported progress percentage.
    ///
    /// Derived from the stage pointer alone; per-stage record statuses do
    /// not participate.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn current_progress(&self, project_id: ProjectId) -> ProjectEngineResult<u8> {
        let project = self.require_project(project_id).await?;
        Ok(project.progress())
    }

    /// Sets the project's commercial status. All assignments are permitted.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn set_project_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
    ) -> ProjectEngineResult<Project> {
        let _guard = self.locks.acquire(project_id).await;
        let mut project = self.require_project(project_id).await?;
        project.set_status(status, &*self.clock);
        self.repository.update_project(&project).await?;
        debug!(project_id = %project_id, status = %status, "project status set");
        Ok(project)
    }

    /// Composes the read model over the project and its three collections.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn summary(&self, project_id: ProjectId) -> ProjectEngineResult<ProjectSummary> {
        let project = self.require_project(project_id).await?;
        let stage_records = self.repository.list_stages(project_id).await?;
        let payment_records = self.repository.list_payments(project_id).await?;
        let task_records = self.repository.list_tasks(project_id).await?;

        Ok(ProjectSummary {
            project_id,
            current_stage: project.current_stage(),
            progress: project.progress(),
            status: project.status(),
            total_value: project.total_value(),
            payment_totals: PaymentTotals::from_records(&payment_records),
            stage_records,
            task_counts: TaskCounts::from_records(&task_records),
        })
    }

    /// Deletes a project and all of its stage, payment, and task records.
    ///
    /// The cascade is atomic; afterwards the project's lock entry is
    /// retired.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn delete_project(&self, project_id: ProjectId) -> ProjectEngineResult<()> {
        let _guard = self.locks.acquire(project_id).await;
        self.repository.delete_project(project_id).await?;
        self.locks.retire(project_id).await;
        debug!(project_id = %project_id, "project deleted with cascade");
        Ok(())
    }

    async fn require_project(&self, project_id: ProjectId) -> ProjectEngineResult<Project> {
        Ok(self
            .repository
            .find_project(project_id)
            .await?
            .ok_or(ProjectRepositoryError::ProjectNotFound(project_id))?)
    }
}
