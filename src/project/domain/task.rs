//! Execution tasks attached to a project.

use super::{ParseTaskStatusError, ProjectDomainError, ProjectId, TaskRecordId, TaskTitle};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Workflow status of an execution task.
///
/// Transitions are free in every direction; finished tasks can be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been raised but not picked up.
    Todo,
    /// Task is being worked on.
    InProgress,
    /// Task is finished.
    Done,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Person a task is assigned to, referenced by identifier or inline name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assignee {
    /// Reference to a person record by identifier.
    Person {
        /// Identifier of the person record.
        id: Uuid,
    },
    /// Inline name with no backing person record.
    Name {
        /// Display name of the assignee.
        name: String,
    },
}

impl Assignee {
    /// Creates an assignee referencing a person record.
    #[must_use]
    pub const fn person(id: Uuid) -> Self {
        Self::Person { id }
    }

    /// Creates an assignee from an inline name.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyAssigneeName`] when the name is
    /// empty after trimming.
    pub fn named(name: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = name.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(ProjectDomainError::EmptyAssigneeName);
        }
        Ok(Self::Name {
            name: normalized.to_owned(),
        })
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person { id } => write!(formatter, "person:{id}"),
            Self::Name { name } => formatter.write_str(name),
        }
    }
}

/// Execution task record owned by a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskRecordId,
    project_id: ProjectId,
    title: TaskTitle,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    assigned_to: Option<Assignee>,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskRecordId,
    /// Owning project identifier.
    pub project_id: ProjectId,
    /// Persisted task title.
    pub title: TaskTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Persisted assignee, if any.
    pub assigned_to: Option<Assignee>,
    /// Persisted workflow status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Creates a new task in [`TaskStatus::Todo`].
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        title: TaskTitle,
        description: Option<String>,
        due_date: Option<NaiveDate>,
        assigned_to: Option<Assignee>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskRecordId::new(),
            project_id,
            title,
            description,
            due_date,
            assigned_to,
            status: TaskStatus::Todo,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            assigned_to: data.assigned_to,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskRecordId {
        self.id
    }

    /// Returns the owning project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date, if set.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the assignee, if set.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<&Assignee> {
        self.assigned_to.as_ref()
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
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

    /// Moves the task to a new workflow status. All moves are permitted.
    pub fn set_status(&mut self, status: TaskStatus, clock: &impl Clock) {
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

/// Task tallies per workflow status for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskCounts {
    /// Number of tasks not yet picked up.
    pub todo: usize,
    /// Number of tasks in progress.
    pub in_progress: usize,
    /// Number of finished tasks.
    pub done: usize,
}

impl TaskCounts {
    /// Tallies a project's task records by workflow status.
    #[must_use]
    pub fn from_records(records: &[TaskRecord]) -> Self {
        records.iter().fold(Self::default(), |mut counts, record| {
            match record.status() {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
            counts
        })
    }

    /// Returns the total number of tasks counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }
}
