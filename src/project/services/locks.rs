//! Per-project serialization of mutating commands.

use crate::project::domain::ProjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-project mutual-exclusion scopes.
///
/// Mutating commands acquire the guard for their target project before
/// touching the repository, so two editors updating the same project
/// serialize while commands on unrelated projects proceed in parallel.
/// Reads are served from the repository snapshot without a guard.
#[derive(Debug, Default)]
pub struct ProjectLockRegistry {
    locks: Mutex<HashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl ProjectLockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the mutual-exclusion guard for a project, creating the
    /// entry on first use.
    pub async fn acquire(&self, project_id: ProjectId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(project_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Retires a project's entry once the project has been deleted.
    ///
    /// Commands arriving afterwards acquire a fresh guard and then fail
    /// against the repository with a not-found error.
    pub async fn retire(&self, project_id: ProjectId) {
        self.locks.lock().await.remove(&project_id);
    }
}
