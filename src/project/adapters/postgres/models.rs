//! Diesel row models for project lifecycle persistence.
//!
//! Each table uses a single row struct for queries, inserts, and updates;
//! `treat_none_as_null` makes full-record writes clear optional columns.

use super::schema::{project_payments, project_stages, project_tasks, projects};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Row model for `projects`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Project name.
    pub name: String,
    /// Delivery stage pointer.
    pub current_stage: String,
    /// Commercial status.
    pub status: String,
    /// Contract value in minor currency units.
    pub total_value: i64,
    /// Optional project category.
    pub category: Option<String>,
    /// Optional property details.
    pub property_details: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for `project_stages`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = project_stages)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StageRow {
    /// Owning project identifier.
    pub project_id: uuid::Uuid,
    /// Delivery stage code.
    pub stage_code: String,
    /// Completion status.
    pub status: String,
    /// Optional start date.
    pub start_date: Option<NaiveDate>,
    /// Optional end date.
    pub end_date: Option<NaiveDate>,
    /// Optional free-form remarks.
    pub remarks: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for `project_payments`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = project_payments)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentRow {
    /// Payment identifier.
    pub id: uuid::Uuid,
    /// Owning project identifier.
    pub project_id: uuid::Uuid,
    /// Milestone label.
    pub milestone: String,
    /// Planned amount in minor currency units.
    pub amount: i64,
    /// Collected amount in minor currency units, when it differs.
    pub actual_amount: Option<i64>,
    /// Collection status.
    pub status: String,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Optional collection instant.
    pub collected_date: Option<DateTime<Utc>>,
    /// Optional invoice number.
    pub invoice_number: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for `project_tasks`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = project_tasks)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning project identifier.
    pub project_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Optional assignee payload.
    pub assigned_to: Option<Value>,
    /// Workflow status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
