//! Delivery stage catalog and per-stage progress records.

use super::{ParseStageCodeError, ParseStageStatusError, ProjectId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed delivery stage a renovation project passes through.
///
/// The catalog is a closed, ordered enumeration: [`Self::Lead`] comes first
/// and [`Self::Warranty`] last. Each code carries a fixed progress weight
/// that never changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCode {
    /// Initial lead captured from an enquiry.
    Lead,
    /// On-site measurement and assessment visit.
    SiteVisit,
    /// Commercial proposal shared with the client.
    Proposal,
    /// Design work in progress.
    Design,
    /// Execution of civil and interior work.
    Execution,
    /// Handover of the finished site to the client.
    Handover,
    /// Post-handover warranty support window.
    Warranty,
}

impl StageCode {
    /// Catalog order, from first contact to warranty support.
    pub const SEQUENCE: [Self; 7] = [
        Self::Lead,
        Self::SiteVisit,
        Self::Proposal,
        Self::Design,
        Self::Execution,
        Self::Handover,
        Self::Warranty,
    ];

    /// Returns the fixed progress percentage reported for this stage.
    ///
    /// The mapping is total over the closed code set and non-decreasing
    /// along [`Self::SEQUENCE`].
    #[must_use]
    pub const fn progress_weight(self) -> u8 {
        match self {
            Self::Lead => 10,
            Self::SiteVisit => 20,
            Self::Proposal => 35,
            Self::Design => 50,
            Self::Execution => 75,
            Self::Handover => 95,
            Self::Warranty => 100,
        }
    }

    /// Returns the position of this stage within [`Self::SEQUENCE`].
    #[must_use]
    pub const fn ordinal(self) -> usize {
        match self {
            Self::Lead => 0,
            Self::SiteVisit => 1,
            Self::Proposal => 2,
            Self::Design => 3,
            Self::Execution => 4,
            Self::Handover => 5,
            Self::Warranty => 6,
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::SiteVisit => "site_visit",
            Self::Proposal => "proposal",
            Self::Design => "design",
            Self::Execution => "execution",
            Self::Handover => "handover",
            Self::Warranty => "warranty",
        }
    }
}

impl fmt::Display for StageCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for StageCode {
    type Error = ParseStageCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "lead" => Ok(Self::Lead),
            "site_visit" => Ok(Self::SiteVisit),
            "proposal" => Ok(Self::Proposal),
            "design" => Ok(Self::Design),
            "execution" => Ok(Self::Execution),
            "handover" => Ok(Self::Handover),
            "warranty" => Ok(Self::Warranty),
            _ => Err(ParseStageCodeError(value.to_owned())),
        }
    }
}

/// Completion status of a single stage record.
///
/// All transitions are free: stages may complete out of catalog order, and a
/// completed stage may be reopened. Progress reporting ignores these
/// statuses entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Work on the stage has not begun.
    NotStarted,
    /// Work on the stage is underway.
    InProgress,
    /// Work on the stage has finished.
    Completed,
    /// The stage was deliberately skipped for this project.
    Skipped,
}

impl StageStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for StageStatus {
    type Error = ParseStageStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            _ => Err(ParseStageStatusError(value.to_owned())),
        }
    }
}

/// Mutable fields written by a stage upsert.
///
/// The payload replaces the record's status, dates, and remarks wholesale;
/// `None` clears the corresponding field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProgressUpdate {
    /// New completion status.
    pub status: StageStatus,
    /// Date work on the stage began, if known.
    pub start_date: Option<NaiveDate>,
    /// Date work on the stage finished, if known.
    pub end_date: Option<NaiveDate>,
    /// Free-form remarks about the stage.
    pub remarks: Option<String>,
}

/// Per-stage progress record, unique per project and stage code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    project_id: ProjectId,
    stage_code: StageCode,
    status: StageStatus,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted stage record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedStageData {
    /// Owning project identifier.
    pub project_id: ProjectId,
    /// Persisted stage code.
    pub stage_code: StageCode,
    /// Persisted completion status.
    pub status: StageStatus,
    /// Persisted start date, if any.
    pub start_date: Option<NaiveDate>,
    /// Persisted end date, if any.
    pub end_date: Option<NaiveDate>,
    /// Persisted remarks, if any.
    pub remarks: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl StageRecord {
    /// Creates a new stage record from an upsert payload.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        stage_code: StageCode,
        update: &StageProgressUpdate,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            project_id,
            stage_code,
            status: update.status,
            start_date: update.start_date,
            end_date: update.end_date,
            remarks: update.remarks.clone(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a stage record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedStageData) -> Self {
        Self {
            project_id: data.project_id,
            stage_code: data.stage_code,
            status: data.status,
            start_date: data.start_date,
            end_date: data.end_date,
            remarks: data.remarks,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the owning project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the stage code.
    #[must_use]
    pub const fn stage_code(&self) -> StageCode {
        self.stage_code
    }

    /// Returns the completion status.
    #[must_use]
    pub const fn status(&self) -> StageStatus {
        self.status
    }

    /// Returns the start date, if set.
    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Returns the end date, if set.
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Returns the remarks, if set.
    #[must_use]
    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
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

    /// Applies an upsert payload to an existing record.
    ///
    /// A payload identical to the current field values leaves the record
    /// untouched, so repeating the same upsert is idempotent.
    pub fn apply(&mut self, update: &StageProgressUpdate, clock: &impl Clock) {
        let unchanged = self.status == update.status
            && self.start_date == update.start_date
            && self.end_date == update.end_date
            && self.remarks == update.remarks;
        if unchanged {
            return;
        }

        self.status = update.status;
        self.start_date = update.start_date;
        self.end_date = update.end_date;
        self.remarks = update.remarks.clone();
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
