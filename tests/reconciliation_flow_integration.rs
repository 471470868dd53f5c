//! End-to-end flows through the project engine: full lifecycle
//! walkthroughs and concurrent commands against shared and unrelated
//! projects.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;

use eames::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{PaymentStatus, ProjectStatus, StageCode, StageRecord, StageStatus, TaskStatus},
    services::{
        CreatePaymentRequest, CreateProjectRequest, CreateTaskRequest, ProjectEngine,
        UpdatePaymentStatusRequest, UpsertStageRequest,
    },
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestEngine = ProjectEngine<InMemoryProjectRepository, DefaultClock>;

#[fixture]
fn engine() -> Arc<TestEngine> {
    Arc::new(ProjectEngine::new(
        Arc::new(InMemoryProjectRepository::new()),
        Arc::new(DefaultClock),
    ))
}

/// Asserts exactly one stage record exists with the expected code.
///
/// # Errors
///
/// Returns an error if the listing does not contain exactly one record
/// matching `expected_code`.
fn assert_single_stage(
    records: &[StageRecord],
    expected_code: StageCode,
) -> Result<(), eyre::Report> {
    eyre::ensure!(
        records.len() == 1,
        "expected exactly one stage record, found {}",
        records.len()
    );
    let record = records
        .first()
        .ok_or_else(|| eyre::eyre!("expected at least one stage record"))?;
    eyre::ensure!(
        record.stage_code() == expected_code,
        "stage code mismatch: {}",
        record.stage_code()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_project_moves_from_lead_to_handover_with_reconciled_payments(
    engine: Arc<TestEngine>,
) {
    let project = engine
        .create_project(
            CreateProjectRequest::new("Kumar Residence", 8_500_000)
                .with_category("full home interiors"),
        )
        .await
        .expect("project creation should succeed");

    // Site visit happens and is recorded; the pointer follows.
    engine
        .advance_stage(project.id(), StageCode::SiteVisit)
        .await
        .expect("stage advance should succeed");
    engine
        .stages()
        .upsert_stage(
            UpsertStageRequest::new(project.id(), StageCode::SiteVisit, StageStatus::Completed)
                .with_remarks("measurements taken"),
        )
        .await
        .expect("stage upsert should succeed");

    // The design fee is invoiced, goes overdue, and is finally collected
    // short of the planned figure.
    let design_fee = engine
        .payments()
        .create_payment(CreatePaymentRequest::new(
            project.id(),
            "Design Fee",
            500_000,
        ))
        .await
        .expect("payment creation should succeed");
    engine
        .payments()
        .update_payment_status(
            UpdatePaymentStatusRequest::new(design_fee.id(), PaymentStatus::Invoiced)
                .with_invoice_number("INV-2024-031"),
        )
        .await
        .expect("invoicing should succeed");
    engine
        .payments()
        .update_payment_status(UpdatePaymentStatusRequest::new(
            design_fee.id(),
            PaymentStatus::Overdue,
        ))
        .await
        .expect("marking overdue should succeed");
    engine
        .payments()
        .update_payment_status(
            UpdatePaymentStatusRequest::new(design_fee.id(), PaymentStatus::Collected)
                .with_actual_amount(480_000),
        )
        .await
        .expect("late collection should succeed");

    // Execution work is tracked on the task board.
    let task = engine
        .tasks()
        .create_task(CreateTaskRequest::new(project.id(), "Modular kitchen install"))
        .await
        .expect("task creation should succeed");
    engine
        .tasks()
        .update_task_status(task.id(), TaskStatus::Done)
        .await
        .expect("status move should succeed");

    engine
        .advance_stage(project.id(), StageCode::Handover)
        .await
        .expect("stage advance should succeed");
    engine
        .set_project_status(project.id(), ProjectStatus::Completed)
        .await
        .expect("status assignment should succeed");

    let summary = engine
        .summary(project.id())
        .await
        .expect("summary should succeed");
    assert_eq!(summary.current_stage, StageCode::Handover);
    assert_eq!(summary.progress, 95);
    assert_eq!(summary.status, ProjectStatus::Completed);
    assert_eq!(summary.payment_totals.total_amount.minor_units(), 500_000);
    assert_eq!(
        summary.payment_totals.total_collected.minor_units(),
        480_000
    );
    assert_eq!(summary.payment_totals.total_pending.minor_units(), 0);
    assert_eq!(summary.task_counts.done, 1);
    assert_single_stage(&summary.stage_records, StageCode::SiteVisit)
        .expect("summary should carry the recorded stage");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_payments_on_one_project_all_land(engine: Arc<TestEngine>) {
    let project = engine
        .create_project(CreateProjectRequest::new("Kapoor Duplex", 4_000_000))
        .await
        .expect("project creation should succeed");

    let mut handles = Vec::new();
    for index in 0..8_i64 {
        let worker = Arc::clone(&engine);
        let project_id = project.id();
        handles.push(tokio::spawn(async move {
            worker
                .payments()
                .create_payment(CreatePaymentRequest::new(
                    project_id,
                    format!("Milestone {index}"),
                    100_000,
                ))
                .await
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("spawned command should not panic")
            .expect("payment creation should succeed");
    }

    let totals = engine
        .payments()
        .totals(project.id())
        .await
        .expect("totals should succeed");
    assert_eq!(totals.total_amount.minor_units(), 800_000);
    assert_eq!(totals.total_pending.minor_units(), 800_000);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_upserts_of_one_stage_leave_a_single_record(engine: Arc<TestEngine>) {
    let project = engine
        .create_project(CreateProjectRequest::new("Kapoor Duplex", 4_000_000))
        .await
        .expect("project creation should succeed");

    let mut handles = Vec::new();
    for status in [
        StageStatus::NotStarted,
        StageStatus::InProgress,
        StageStatus::Completed,
        StageStatus::InProgress,
    ] {
        let worker = Arc::clone(&engine);
        let project_id = project.id();
        handles.push(tokio::spawn(async move {
            worker
                .stages()
                .upsert_stage(UpsertStageRequest::new(
                    project_id,
                    StageCode::Execution,
                    status,
                ))
                .await
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("spawned command should not panic")
            .expect("stage upsert should succeed");
    }

    let listed = engine
        .stages()
        .list_stages(project.id())
        .await
        .expect("listing should succeed");
    assert_single_stage(&listed, StageCode::Execution)
        .expect("concurrent upserts must not duplicate the record");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unrelated_projects_progress_independently(engine: Arc<TestEngine>) {
    let first = engine
        .create_project(CreateProjectRequest::new("Mehta Apartment", 2_400_000))
        .await
        .expect("project creation should succeed");
    let second = engine
        .create_project(CreateProjectRequest::new("Kapoor Duplex", 4_000_000))
        .await
        .expect("project creation should succeed");

    let (first_result, second_result) = tokio::join!(
        engine.advance_stage(first.id(), StageCode::Design),
        engine.advance_stage(second.id(), StageCode::Warranty),
    );
    first_result.expect("first advance should succeed");
    second_result.expect("second advance should succeed");

    assert_eq!(
        engine
            .current_progress(first.id())
            .await
            .expect("progress lookup should succeed"),
        50
    );
    assert_eq!(
        engine
            .current_progress(second.id())
            .await
            .expect("progress lookup should succeed"),
        100
    );
}
