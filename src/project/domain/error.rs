//! Error types for project domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating domain project values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The payment milestone label is empty after trimming.
    #[error("payment milestone label must not be empty")]
    EmptyMilestoneLabel,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The inline assignee name is empty after trimming.
    #[error("assignee name must not be empty")]
    EmptyAssigneeName,

    /// The monetary amount is negative.
    #[error("invalid amount {0}, expected zero or more minor currency units")]
    InvalidAmount(i64),

    /// The payment status change is not permitted.
    #[error("invalid payment transition: cannot move from {from} to {to}")]
    InvalidPaymentTransition {
        /// Status the payment currently holds.
        from: String,
        /// Status the caller attempted to move to.
        to: String,
    },
}

/// Error returned while parsing stage codes from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown stage code: {0}")]
pub struct ParseStageCodeError(pub String);

/// Error returned while parsing stage statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown stage status: {0}")]
pub struct ParseStageStatusError(pub String);

/// Error returned while parsing payment statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown payment status: {0}")]
pub struct ParsePaymentStatusError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing project statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project status: {0}")]
pub struct ParseProjectStatusError(pub String);
