//! Project aggregate root and composed read model.

use super::{
    Money, ParseProjectStatusError, PaymentTotals, ProjectId, ProjectName, StageCode, StageRecord,
    TaskCounts,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commercial status of a project.
///
/// Assigned directly by collaborators; no state machine ties it to the
/// delivery stage pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Project is being delivered.
    Active,
    /// Project is paused.
    OnHold,
    /// Project has been delivered.
    Completed,
}

impl ProjectStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProjectStatus {
    type Error = ParseProjectStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseProjectStatusError(value.to_owned())),
        }
    }
}

/// Project aggregate root.
///
/// The `current_stage` pointer is the single source of truth for reported
/// progress. Stage records track per-stage detail independently and never
/// feed the progress figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    current_stage: StageCode,
    status: ProjectStatus,
    total_value: Money,
    category: Option<String>,
    property_details: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted project name.
    pub name: ProjectName,
    /// Persisted stage pointer.
    pub current_stage: StageCode,
    /// Persisted commercial status.
    pub status: ProjectStatus,
    /// Persisted contract value.
    pub total_value: Money,
    /// Persisted project category, if any.
    pub category: Option<String>,
    /// Persisted property details, if any.
    pub property_details: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new active project at the [`StageCode::Lead`] stage.
    #[must_use]
    pub fn new(name: ProjectName, total_value: Money, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ProjectId::new(),
            name,
            current_stage: StageCode::Lead,
            status: ProjectStatus::Active,
            total_value,
            category: None,
            property_details: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            current_stage: data.current_stage,
            status: data.status,
            total_value: data.total_value,
            category: data.category,
            property_details: data.property_details,
            created_at: data.created_at,
            updated_at: data.updated_at,
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

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the stage pointer.
    #[must_use]
    pub const fn current_stage(&self) -> StageCode {
        self.current_stage
    }

    /// Returns the commercial status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns the contract value.
    #[must_use]
    pub const fn total_value(&self) -> Money {
        self.total_value
    }

    /// Returns the project category, if set.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the property details, if set.
    #[must_use]
    pub fn property_details(&self) -> Option<&str> {
        self.property_details.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the reported progress percentage.
    ///
    /// Derived from the stage pointer alone: a project at
    /// [`StageCode::Execution`] reports 75 even when no stage record exists
    /// for the execution stage.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.current_stage.progress_weight()
    }

    /// Moves the stage pointer.
    ///
    /// No monotonicity is enforced; the pointer may move backward through
    /// the catalog.
    pub fn advance_stage(&mut self, stage: StageCode, clock: &impl Clock) {
        if self.current_stage == stage {
            return;
        }
        self.current_stage = stage;
        self.touch(clock);
    }

    /// Sets the commercial status. All assignments are permitted.
    pub fn set_status(&mut self, status: ProjectStatus, clock: &impl Clock) {
        if self.status == status {
            return;
        }
        self.status = status;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Composed read model over a project and its three record collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// Project identifier.
    pub project_id: ProjectId,
    /// Stage pointer at the time of the snapshot.
    pub current_stage: StageCode,
    /// Progress percentage derived from the stage pointer.
    pub progress: u8,
    /// Commercial status.
    pub status: ProjectStatus,
    /// Contract value.
    pub total_value: Money,
    /// Aggregate payment figures.
    pub payment_totals: PaymentTotals,
    /// Stage records in catalog order; missing stages are omitted.
    pub stage_records: Vec<StageRecord>,
    /// Task tallies per workflow status.
    pub task_counts: TaskCounts,
}
