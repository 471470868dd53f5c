//! In-memory repository for project lifecycle tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::project::{
    domain::{
        PaymentId, PaymentRecord, Project, ProjectId, StageCode, StageRecord, TaskRecord,
        TaskRecordId,
    },
    ports::{
        PaymentRepository, ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult,
        StageRepository, TaskRepository,
    },
};

/// Thread-safe in-memory project repository.
///
/// All four collections live behind one lock, so the cascade delete removes
/// a project and its owned records in a single atomic step.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    state: Arc<RwLock<InMemoryProjectState>>,
}

#[derive(Debug, Default)]
struct InMemoryProjectState {
    projects: HashMap<ProjectId, Project>,
    stages: HashMap<ProjectId, HashMap<StageCode, StageRecord>>,
    payments: HashMap<PaymentId, PaymentRecord>,
    payment_index: HashMap<ProjectId, Vec<PaymentId>>,
    tasks: HashMap<TaskRecordId, TaskRecord>,
    task_index: HashMap<ProjectId, Vec<TaskRecordId>>,
}

impl InMemoryProjectRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> ProjectRepositoryResult<RwLockReadGuard<'_, InMemoryProjectState>> {
        self.state.read().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> ProjectRepositoryResult<RwLockWriteGuard<'_, InMemoryProjectState>> {
        self.state.write().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

fn ensure_project(
    state: &InMemoryProjectState,
    project_id: ProjectId,
) -> ProjectRepositoryResult<()> {
    if state.projects.contains_key(&project_id) {
        Ok(())
    } else {
        Err(ProjectRepositoryError::ProjectNotFound(project_id))
    }
}

#[async_trait]
impl StageRepository for InMemoryProjectRepository {
    async fn upsert_stage(&self, record: &StageRecord) -> ProjectRepositoryResult<()> {
        let mut state = self.write_state()?;
        ensure_project(&state, record.project_id())?;
        state
            .stages
            .entry(record.project_id())
            .or_default()
            .insert(record.stage_code(), record.clone());
        Ok(())
    }

    async fn find_stage(
        &self,
        project_id: ProjectId,
        stage_code: StageCode,
    ) -> ProjectRepositoryResult<Option<StageRecord>> {
        let state = self.read_state()?;
        let record = state
            .stages
            .get(&project_id)
            .and_then(|by_code| by_code.get(&stage_code))
            .cloned();
        Ok(record)
    }

    async fn list_stages(
        &self,
        project_id: ProjectId,
    ) -> ProjectRepositoryResult<Vec<StageRecord>> {
        let state = self.read_state()?;
        ensure_project(&state, project_id)?;
        let records = state
            .stages
            .get(&project_id)
            .map(|by_code| {
                StageCode::SEQUENCE
                    .iter()
                    .filter_map(|code| by_code.get(code).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryProjectRepository {
    async fn store_payment(&self, record: &PaymentRecord) -> ProjectRepositoryResult<()> {
        let mut state = self.write_state()?;
        ensure_project(&state, record.project_id())?;
        state
            .payment_index
            .entry(record.project_id())
            .or_default()
            .push(record.id());
        state.payments.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update_payment(&self, record: &PaymentRecord) -> ProjectRepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.payments.contains_key(&record.id()) {
            return Err(ProjectRepositoryError::PaymentNotFound(record.id()));
        }
        state.payments.insert(record.id(), record.clone());
        Ok(())
    }

    async fn find_payment(
        &self,
        id: PaymentId,
    ) -> ProjectRepositoryResult<Option<PaymentRecord>> {
        let state = self.read_state()?;
        Ok(state.payments.get(&id).cloned())
    }

    async fn list_payments(
        &self,
        project_id: ProjectId,
    ) -> ProjectRepositoryResult<Vec<PaymentRecord>> {
        let state = self.read_state()?;
        ensure_project(&state, project_id)?;
        let records = state
            .payment_index
            .get(&project_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.payments.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }
}

#[async_trait]
impl TaskRepository for InMemoryProjectRepository {
    async fn store_task(&self, record: &TaskRecord) -> ProjectRepositoryResult<()> {
        let mut state = self.write_state()?;
        ensure_project(&state, record.project_id())?;
        state
            .task_index
            .entry(record.project_id())
            .or_default()
            .push(record.id());
        state.tasks.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update_task(&self, record: &TaskRecord) -> ProjectRepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.tasks.contains_key(&record.id()) {
            return Err(ProjectRepositoryError::TaskNotFound(record.id()));
        }
        state.tasks.insert(record.id(), record.clone());
        Ok(())
    }

    async fn find_task(&self, id: TaskRecordId) -> ProjectRepositoryResult<Option<TaskRecord>> {
        let state = self.read_state()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_tasks(
        &self,
        project_id: ProjectId,
    ) -> ProjectRepositoryResult<Vec<TaskRecord>> {
        let state = self.read_state()?;
        ensure_project(&state, project_id)?;
        let records = state
            .task_index
            .get(&project_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn store_project(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.projects.contains_key(&project.id()) {
            return Err(ProjectRepositoryError::DuplicateProject(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.projects.contains_key(&project.id()) {
            return Err(ProjectRepositoryError::ProjectNotFound(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        let state = self.read_state()?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn delete_project(&self, id: ProjectId) -> ProjectRepositoryResult<()> {
        // One write lock spans the whole cascade, so either every owned
        // record and the project disappear together or nothing changes.
        let mut state = self.write_state()?;
        if state.projects.remove(&id).is_none() {
            return Err(ProjectRepositoryError::ProjectNotFound(id));
        }
        state.stages.remove(&id);
        if let Some(payment_ids) = state.payment_index.remove(&id) {
            for payment_id in payment_ids {
                state.payments.remove(&payment_id);
            }
        }
        if let Some(task_ids) = state.task_index.remove(&id) {
            for task_id in task_ids {
                state.tasks.remove(&task_id);
            }
        }
        Ok(())
    }
}
