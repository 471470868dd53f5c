//! Behaviour tests for milestone creation, status moves, and totals.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;

use crate::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{PaymentId, PaymentStatus, Project, ProjectDomainError, ProjectId},
    ports::ProjectRepositoryError,
    services::{
        CreatePaymentRequest, CreateProjectRequest, ProjectEngine, ProjectEngineError,
        UpdatePaymentStatusRequest,
    },
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestEngine = ProjectEngine<InMemoryProjectRepository, DefaultClock>;

#[fixture]
fn engine() -> TestEngine {
    ProjectEngine::new(
        Arc::new(InMemoryProjectRepository::new()),
        Arc::new(DefaultClock),
    )
}

async fn seeded_project(engine: &TestEngine) -> Project {
    engine
        .create_project(CreateProjectRequest::new("Kumar Residence", 8_500_000))
        .await
        .expect("project creation should succeed")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_milestones_start_pending(engine: TestEngine) {
    let project = seeded_project(&engine).await;

    let payment = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(
            project.id(),
            "Booking Advance",
            250_000,
        ))
        .await
        .expect("payment creation should succeed");

    assert_eq!(payment.status(), PaymentStatus::Pending);
    assert_eq!(payment.amount().minor_units(), 250_000);
    assert!(payment.collected_date().is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn negative_amounts_are_rejected(engine: TestEngine) {
    let project = seeded_project(&engine).await;

    let result = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(project.id(), "Advance", -500))
        .await;

    assert!(matches!(
        result,
        Err(ProjectEngineError::Domain(
            ProjectDomainError::InvalidAmount(-500)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_milestone_labels_are_rejected(engine: TestEngine) {
    let project = seeded_project(&engine).await;

    let result = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(project.id(), "   ", 500))
        .await;

    assert!(matches!(
        result,
        Err(ProjectEngineError::Domain(
            ProjectDomainError::EmptyMilestoneLabel
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn milestones_for_unknown_projects_are_rejected(engine: TestEngine) {
    let result = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(ProjectId::new(), "Advance", 500))
        .await;

    assert!(matches!(
        result,
        Err(ProjectEngineError::Repository(
            ProjectRepositoryError::ProjectNotFound(_)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn collecting_without_an_instant_uses_the_clock(engine: TestEngine) {
    let project = seeded_project(&engine).await;
    let payment = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(project.id(), "Design Fee", 500_000))
        .await
        .expect("payment creation should succeed");

    let collected = engine
        .payments()
        .update_payment_status(UpdatePaymentStatusRequest::new(
            payment.id(),
            PaymentStatus::Collected,
        ))
        .await
        .expect("collection should succeed");

    assert_eq!(collected.status(), PaymentStatus::Collected);
    assert!(collected.collected_date().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invoicing_records_the_invoice_number(engine: TestEngine) {
    let project = seeded_project(&engine).await;
    let payment = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(project.id(), "Design Fee", 500_000))
        .await
        .expect("payment creation should succeed");

    let invoiced = engine
        .payments()
        .update_payment_status(
            UpdatePaymentStatusRequest::new(payment.id(), PaymentStatus::Invoiced)
                .with_invoice_number("INV-2024-017"),
        )
        .await
        .expect("invoicing should succeed");

    assert_eq!(invoiced.status(), PaymentStatus::Invoiced);
    assert_eq!(invoiced.invoice_number(), Some("INV-2024-017"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pending_means_not_yet_collected(engine: TestEngine) {
    let project = seeded_project(&engine).await;
    let payments = engine.payments();

    let invoiced = payments
        .create_payment(CreatePaymentRequest::new(project.id(), "Advance", 100))
        .await
        .expect("payment creation should succeed");
    payments
        .update_payment_status(UpdatePaymentStatusRequest::new(
            invoiced.id(),
            PaymentStatus::Invoiced,
        ))
        .await
        .expect("invoicing should succeed");

    let overdue = payments
        .create_payment(CreatePaymentRequest::new(project.id(), "Stage Two", 200))
        .await
        .expect("payment creation should succeed");
    payments
        .update_payment_status(UpdatePaymentStatusRequest::new(
            overdue.id(),
            PaymentStatus::Overdue,
        ))
        .await
        .expect("marking overdue should succeed");

    let collected = payments
        .create_payment(CreatePaymentRequest::new(project.id(), "Final", 400))
        .await
        .expect("payment creation should succeed");
    payments
        .update_payment_status(UpdatePaymentStatusRequest::new(
            collected.id(),
            PaymentStatus::Collected,
        ))
        .await
        .expect("collection should succeed");

    let totals = payments
        .totals(project.id())
        .await
        .expect("totals should succeed");

    // Invoiced and overdue milestones still count as pending.
    assert_eq!(totals.total_amount.minor_units(), 700);
    assert_eq!(totals.total_collected.minor_units(), 400);
    assert_eq!(totals.total_pending.minor_units(), 300);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn collection_cannot_be_undone(engine: TestEngine) {
    let project = seeded_project(&engine).await;
    let payment = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(project.id(), "Design Fee", 500_000))
        .await
        .expect("payment creation should succeed");
    engine
        .payments()
        .update_payment_status(UpdatePaymentStatusRequest::new(
            payment.id(),
            PaymentStatus::Collected,
        ))
        .await
        .expect("collection should succeed");

    let result = engine
        .payments()
        .update_payment_status(UpdatePaymentStatusRequest::new(
            payment.id(),
            PaymentStatus::Pending,
        ))
        .await;

    assert!(matches!(
        result,
        Err(ProjectEngineError::Domain(
            ProjectDomainError::InvalidPaymentTransition { .. }
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_milestones_can_still_be_collected(engine: TestEngine) {
    let project = seeded_project(&engine).await;
    let payment = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(project.id(), "Stage Two", 200))
        .await
        .expect("payment creation should succeed");
    engine
        .payments()
        .update_payment_status(UpdatePaymentStatusRequest::new(
            payment.id(),
            PaymentStatus::Overdue,
        ))
        .await
        .expect("marking overdue should succeed");

    let collected = engine
        .payments()
        .update_payment_status(UpdatePaymentStatusRequest::new(
            payment.id(),
            PaymentStatus::Collected,
        ))
        .await
        .expect("late collection should succeed");

    assert_eq!(collected.status(), PaymentStatus::Collected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_payments_are_reported(engine: TestEngine) {
    let result = engine
        .payments()
        .update_payment_status(UpdatePaymentStatusRequest::new(
            PaymentId::new(),
            PaymentStatus::Invoiced,
        ))
        .await;

    assert!(matches!(
        result,
        Err(ProjectEngineError::Repository(
            ProjectRepositoryError::PaymentNotFound(_)
        ))
    ));
}
