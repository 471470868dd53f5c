//! Task board service owning execution task records.

use super::error::ProjectEngineResult;
use super::locks::ProjectLockRegistry;
use crate::project::{
    domain::{Assignee, ProjectId, TaskRecord, TaskRecordId, TaskStatus, TaskTitle},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// Request payload for creating an execution task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    assigned_to: Option<Assignee>,
}

impl CreateTaskRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            due_date: None,
            assigned_to: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Assigns the task to a person.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Assignee) -> Self {
        self.assigned_to = Some(assignee);
        self
    }
}

/// Task board orchestration service.
#[derive(Clone)]
pub struct TaskBoard<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    locks: Arc<ProjectLockRegistry>,
}

impl<R, C> TaskBoard<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task board sharing the engine's lock registry.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        clock: Arc<C>,
        locks: Arc<ProjectLockRegistry>,
    ) -> Self {
        Self {
            repository,
            clock,
            locks,
        }
    }

    /// Creates a new task in the to-do column.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Domain`] when the title is
    /// blank, and [`super::ProjectEngineError::Repository`] when the
    /// project is unknown or persistence fails.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
    ) -> ProjectEngineResult<TaskRecord> {
        let title = TaskTitle::new(request.title)?;

        let _guard = self.locks.acquire(request.project_id).await;
        self.repository
            .find_project(request.project_id)
            .await?
            .ok_or(ProjectRepositoryError::ProjectNotFound(request.project_id))?;

        let record = TaskRecord::new(
            request.project_id,
            title,
            request.description,
            request.due_date,
            request.assigned_to,
            &*self.clock,
        );
        self.repository.store_task(&record).await?;
        debug!(
            project_id = %record.project_id(),
            task_id = %record.id(),
            "task created"
        );
        Ok(record)
    }

    /// Moves a task to a new workflow status.
    ///
    /// All moves are permitted; finished tasks can be reopened.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the task is
    /// unknown or persistence fails.
    pub async fn update_task_status(
        &self,
        task_id: TaskRecordId,
        status: TaskStatus,
    ) -> ProjectEngineResult<TaskRecord> {
        let located = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(ProjectRepositoryError::TaskNotFound(task_id))?;

        // The first read only locates the owning project; re-read under the
        // project guard before mutating.
        let _guard = self.locks.acquire(located.project_id()).await;
        let mut record = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(ProjectRepositoryError::TaskNotFound(task_id))?;

        record.set_status(status, &*self.clock);
        self.repository.update_task(&record).await?;
        debug!(task_id = %record.id(), status = %record.status(), "task status updated");
        Ok(record)
    }

    /// Lists a project's tasks, optionally filtered by workflow status.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn list_tasks(
        &self,
        project_id: ProjectId,
        filter: Option<TaskStatus>,
    ) -> ProjectEngineResult<Vec<TaskRecord>> {
        let mut records = self.repository.list_tasks(project_id).await?;
        if let Some(status) = filter {
            records.retain(|record| record.status() == status);
        }
        Ok(records)
    }
}
