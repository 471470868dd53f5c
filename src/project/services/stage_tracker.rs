//! Stage tracker service owning per-stage progress records.

use super::error::ProjectEngineResult;
use super::locks::ProjectLockRegistry;
use crate::project::{
    domain::{ProjectId, StageCode, StageProgressUpdate, StageRecord, StageStatus},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// Request payload for creating or updating a stage record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertStageRequest {
    project_id: ProjectId,
    stage_code: StageCode,
    status: StageStatus,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    remarks: Option<String>,
}

impl UpsertStageRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub const fn new(project_id: ProjectId, stage_code: StageCode, status: StageStatus) -> Self {
        Self {
            project_id,
            stage_code,
            status,
            start_date: None,
            end_date: None,
            remarks: None,
        }
    }

    /// Sets the date work on the stage began.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Sets the date work on the stage finished.
    #[must_use]
    pub const fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Sets free-form remarks about the stage.
    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

/// Stage tracker orchestration service.
#[derive(Clone)]
pub struct StageTracker<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    locks: Arc<ProjectLockRegistry>,
}

impl<R, C> StageTracker<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new stage tracker sharing the engine's lock registry.
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

    /// Creates the stage record if absent, otherwise merges the payload
    /// into the existing record.
    ///
    /// No ordering constraint is enforced between stages: a handover
    /// record may complete while the site visit has not started. Repeating
    /// an identical upsert yields an identical record.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn upsert_stage(
        &self,
        request: UpsertStageRequest,
    ) -> ProjectEngineResult<StageRecord> {
        let _guard = self.locks.acquire(request.project_id).await;
        self.repository
            .find_project(request.project_id)
            .await?
            .ok_or(ProjectRepositoryError::ProjectNotFound(request.project_id))?;

        let update = StageProgressUpdate {
            status: request.status,
            start_date: request.start_date,
            end_date: request.end_date,
            remarks: request.remarks,
        };
        let existing = self
            .repository
            .find_stage(request.project_id, request.stage_code)
            .await?;
        let record = existing.map_or_else(
            || StageRecord::new(request.project_id, request.stage_code, &update, &*self.clock),
            |mut found| {
                found.apply(&update, &*self.clock);
                found
            },
        );
        self.repository.upsert_stage(&record).await?;
        debug!(
            project_id = %record.project_id(),
            stage = %record.stage_code(),
            status = %record.status(),
            "stage record upserted"
        );
        Ok(record)
    }

    /// Lists a project's stage records in catalog order.
    ///
    /// Stages without a record are omitted, not synthesized.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn list_stages(
        &self,
        project_id: ProjectId,
    ) -> ProjectEngineResult<Vec<StageRecord>> {
        Ok(self.repository.list_stages(project_id).await?)
    }
}
