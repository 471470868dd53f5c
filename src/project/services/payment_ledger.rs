//! Payment ledger service owning milestone records and aggregates.

use super::error::ProjectEngineResult;
use super::locks::ProjectLockRegistry;
use crate::project::{
    domain::{
        MilestoneLabel, Money, PaymentId, PaymentRecord, PaymentStatus, PaymentStatusUpdate,
        PaymentTotals, ProjectId,
    },
    ports::{ProjectRepository, ProjectRepositoryError},
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// Request payload for creating a payment milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePaymentRequest {
    project_id: ProjectId,
    milestone: String,
    amount_minor_units: i64,
    due_date: Option<NaiveDate>,
}

impl CreatePaymentRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        milestone: impl Into<String>,
        amount_minor_units: i64,
    ) -> Self {
        Self {
            project_id,
            milestone: milestone.into(),
            amount_minor_units,
            due_date: None,
        }
    }

    /// Sets the milestone due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Request payload for moving a payment to a new collection status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePaymentStatusRequest {
    payment_id: PaymentId,
    status: PaymentStatus,
    actual_amount_minor_units: Option<i64>,
    invoice_number: Option<String>,
    collected_date: Option<DateTime<Utc>>,
}

impl UpdatePaymentStatusRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub const fn new(payment_id: PaymentId, status: PaymentStatus) -> Self {
        Self {
            payment_id,
            status,
            actual_amount_minor_units: None,
            invoice_number: None,
            collected_date: None,
        }
    }

    /// Records the amount actually received.
    #[must_use]
    pub const fn with_actual_amount(mut self, amount_minor_units: i64) -> Self {
        self.actual_amount_minor_units = Some(amount_minor_units);
        self
    }

    /// Records the invoice number issued for the milestone.
    #[must_use]
    pub fn with_invoice_number(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = Some(invoice_number.into());
        self
    }

    /// Sets an explicit collection instant instead of the clock default.
    #[must_use]
    pub const fn with_collected_date(mut self, collected_date: DateTime<Utc>) -> Self {
        self.collected_date = Some(collected_date);
        self
    }
}

/// Payment ledger orchestration service.
#[derive(Clone)]
pub struct PaymentLedger<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    locks: Arc<ProjectLockRegistry>,
}

impl<R, C> PaymentLedger<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new payment ledger sharing the engine's lock registry.
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

    /// Creates a new pending milestone for a project.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Domain`] when the label is
    /// blank or the amount negative, and
    /// [`super::ProjectEngineError::Repository`] when the project is
    /// unknown or persistence fails.
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> ProjectEngineResult<PaymentRecord> {
        let milestone = MilestoneLabel::new(request.milestone)?;
        let amount = Money::new(request.amount_minor_units)?;

        let _guard = self.locks.acquire(request.project_id).await;
        self.repository
            .find_project(request.project_id)
            .await?
            .ok_or(ProjectRepositoryError::ProjectNotFound(request.project_id))?;

        let record = PaymentRecord::new(
            request.project_id,
            milestone,
            amount,
            request.due_date,
            &*self.clock,
        );
        self.repository.store_payment(&record).await?;
        debug!(
            project_id = %record.project_id(),
            payment_id = %record.id(),
            milestone = %record.milestone(),
            "payment milestone created"
        );
        Ok(record)
    }

    /// Moves a milestone to a new collection status.
    ///
    /// Collecting a milestone stamps the collection instant with the
    /// supplied value or, failing that, the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Domain`] when the transition is
    /// forbidden or the actual amount negative, and
    /// [`super::ProjectEngineError::Repository`] when the payment is
    /// unknown or persistence fails.
    pub async fn update_payment_status(
        &self,
        request: UpdatePaymentStatusRequest,
    ) -> ProjectEngineResult<PaymentRecord> {
        let located = self
            .repository
            .find_payment(request.payment_id)
            .await?
            .ok_or(ProjectRepositoryError::PaymentNotFound(request.payment_id))?;

        // The first read only locates the owning project; re-read under the
        // project guard before mutating.
        let _guard = self.locks.acquire(located.project_id()).await;
        let mut record = self
            .repository
            .find_payment(request.payment_id)
            .await?
            .ok_or(ProjectRepositoryError::PaymentNotFound(request.payment_id))?;

        let actual_amount = request
            .actual_amount_minor_units
            .map(Money::new)
            .transpose()?;
        record.transition(
            PaymentStatusUpdate {
                status: request.status,
                actual_amount,
                invoice_number: request.invoice_number,
                collected_date: request.collected_date,
            },
            &*self.clock,
        )?;
        self.repository.update_payment(&record).await?;
        debug!(
            payment_id = %record.id(),
            status = %record.status(),
            "payment status updated"
        );
        Ok(record)
    }

    /// Computes aggregate payment figures for a project.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn totals(&self, project_id: ProjectId) -> ProjectEngineResult<PaymentTotals> {
        let records = self.repository.list_payments(project_id).await?;
        Ok(PaymentTotals::from_records(&records))
    }

    /// Lists a project's payment milestones.
    ///
    /// # Errors
    ///
    /// Returns [`super::ProjectEngineError::Repository`] when the project
    /// is unknown or persistence fails.
    pub async fn list_payments(
        &self,
        project_id: ProjectId,
    ) -> ProjectEngineResult<Vec<PaymentRecord>> {
        Ok(self.repository.list_payments(project_id).await?)
    }
}
