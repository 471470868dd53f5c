//! Payment milestones and collection reconciliation.

use super::{
    MilestoneLabel, Money, ParsePaymentStatusError, PaymentId, ProjectDomainError, ProjectId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection status of a payment milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Milestone raised, not yet invoiced.
    Pending,
    /// Invoice issued to the client.
    Invoiced,
    /// Payment received. Terminal.
    Collected,
    /// Payment missed its due date.
    Overdue,
}

impl PaymentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Invoiced => "invoiced",
            Self::Collected => "collected",
            Self::Overdue => "overdue",
        }
    }

    /// Returns whether transition to `target` is allowed.
    ///
    /// Collection is terminal: no transition leaves [`Self::Collected`]. An
    /// overdue milestone may still be collected, since "pending" in the
    /// reconciliation sense means "not yet collected".
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Invoiced | Self::Collected | Self::Overdue
            ) | (Self::Invoiced, Self::Collected | Self::Overdue)
                | (Self::Overdue, Self::Collected)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = ParsePaymentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "invoiced" => Ok(Self::Invoiced),
            "collected" => Ok(Self::Collected),
            "overdue" => Ok(Self::Overdue),
            _ => Err(ParsePaymentStatusError(value.to_owned())),
        }
    }
}

/// Fields written alongside a payment status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatusUpdate {
    /// Target collection status.
    pub status: PaymentStatus,
    /// Amount actually received, when it differs from the planned amount.
    pub actual_amount: Option<Money>,
    /// Invoice number issued for the milestone.
    pub invoice_number: Option<String>,
    /// Explicit collection instant; defaults to the current clock time when
    /// the target status is [`PaymentStatus::Collected`].
    pub collected_date: Option<DateTime<Utc>>,
}

/// Payment milestone record owned by a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    id: PaymentId,
    project_id: ProjectId,
    milestone: MilestoneLabel,
    amount: Money,
    actual_amount: Option<Money>,
    status: PaymentStatus,
    due_date: Option<NaiveDate>,
    collected_date: Option<DateTime<Utc>>,
    invoice_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted payment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPaymentData {
    /// Persisted payment identifier.
    pub id: PaymentId,
    /// Owning project identifier.
    pub project_id: ProjectId,
    /// Persisted milestone label.
    pub milestone: MilestoneLabel,
    /// Persisted planned amount.
    pub amount: Money,
    /// Persisted collected amount, if any.
    pub actual_amount: Option<Money>,
    /// Persisted collection status.
    pub status: PaymentStatus,
    /// Persisted due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Persisted collection instant, if any.
    pub collected_date: Option<DateTime<Utc>>,
    /// Persisted invoice number, if any.
    pub invoice_number: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Creates a new pending milestone.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        milestone: MilestoneLabel,
        amount: Money,
        due_date: Option<NaiveDate>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: PaymentId::new(),
            project_id,
            milestone,
            amount,
            actual_amount: None,
            status: PaymentStatus::Pending,
            due_date,
            collected_date: None,
            invoice_number: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a payment record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPaymentData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            milestone: data.milestone,
            amount: data.amount,
            actual_amount: data.actual_amount,
            status: data.status,
            due_date: data.due_date,
            collected_date: data.collected_date,
            invoice_number: data.invoice_number,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the payment identifier.
    #[must_use]
    pub const fn id(&self) -> PaymentId {
        self.id
    }

    /// Returns the owning project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the milestone label.
    #[must_use]
    pub const fn milestone(&self) -> &MilestoneLabel {
        &self.milestone
    }

    /// Returns the planned amount.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the recorded collected amount, if any.
    #[must_use]
    pub const fn actual_amount(&self) -> Option<Money> {
        self.actual_amount
    }

    /// Returns the collection status.
    #[must_use]
    pub const fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Returns the due date, if set.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the collection instant, if set.
    #[must_use]
    pub const fn collected_date(&self) -> Option<DateTime<Utc>> {
        self.collected_date
    }

    /// Returns the invoice number, if set.
    #[must_use]
    pub fn invoice_number(&self) -> Option<&str> {
        self.invoice_number.as_deref()
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

    /// Returns the amount that counts toward collected totals: the recorded
    /// actual amount when present, the planned amount otherwise.
    #[must_use]
    pub fn collected_amount(&self) -> Money {
        self.actual_amount.unwrap_or(self.amount)
    }

    /// Moves the milestone to a new collection status.
    ///
    /// Moving to [`PaymentStatus::Collected`] stamps the collection instant
    /// with the supplied value or, failing that, the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidPaymentTransition`] when the
    /// status matrix forbids the move.
    pub fn transition(
        &mut self,
        update: PaymentStatusUpdate,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if !self.status.can_transition_to(update.status) {
            return Err(ProjectDomainError::InvalidPaymentTransition {
                from: self.status.as_str().to_owned(),
                to: update.status.as_str().to_owned(),
            });
        }

        self.status = update.status;
        if let Some(actual) = update.actual_amount {
            self.actual_amount = Some(actual);
        }
        if let Some(invoice_number) = update.invoice_number {
            self.invoice_number = Some(invoice_number);
        }
        if matches!(self.status, PaymentStatus::Collected) {
            self.collected_date = Some(update.collected_date.unwrap_or_else(|| clock.utc()));
        }
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Aggregate payment figures for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTotals {
    /// Sum of planned amounts over every milestone.
    pub total_amount: Money,
    /// Sum of collected amounts over collected milestones.
    pub total_collected: Money,
    /// Sum of planned amounts over milestones not yet collected.
    pub total_pending: Money,
}

impl PaymentTotals {
    /// Totals over an empty ledger.
    pub const EMPTY: Self = Self {
        total_amount: Money::ZERO,
        total_collected: Money::ZERO,
        total_pending: Money::ZERO,
    };

    /// Computes aggregate figures over a project's payment records.
    ///
    /// "Pending" means not yet collected: invoiced and overdue milestones
    /// count toward `total_pending`, not only those literally in the
    /// `pending` status.
    #[must_use]
    pub fn from_records(records: &[PaymentRecord]) -> Self {
        records.iter().fold(Self::EMPTY, |totals, record| {
            let collected = matches!(record.status(), PaymentStatus::Collected);
            Self {
                total_amount: totals.total_amount.saturating_add(record.amount()),
                total_collected: if collected {
                    totals.total_collected.saturating_add(record.collected_amount())
                } else {
                    totals.total_collected
                },
                total_pending: if collected {
                    totals.total_pending
                } else {
                    totals.total_pending.saturating_add(record.amount())
                },
            }
        })
    }
}
