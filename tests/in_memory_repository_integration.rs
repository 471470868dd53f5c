//! Behavioural integration tests for the in-memory project repository.
//!
//! These tests exercise the repository contract directly, without the
//! service layer, verifying upsert-by-key semantics, per-project listing,
//! and the atomic cascade delete.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use eames::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{
        MilestoneLabel, Money, PaymentRecord, Project, ProjectName, StageCode,
        StageProgressUpdate, StageRecord, StageStatus, TaskRecord, TaskTitle,
    },
    ports::{
        PaymentRepository, ProjectRepository, ProjectRepositoryError, StageRepository,
        TaskRepository,
    },
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn repository() -> InMemoryProjectRepository {
    InMemoryProjectRepository::new()
}

fn build_project(name: &str) -> Project {
    let project_name = ProjectName::new(name).expect("valid project name");
    let value = Money::new(2_400_000).expect("valid amount");
    Project::new(project_name, value, &DefaultClock)
}

fn build_stage(project: &Project, code: StageCode, status: StageStatus) -> StageRecord {
    let update = StageProgressUpdate {
        status,
        start_date: None,
        end_date: None,
        remarks: None,
    };
    StageRecord::new(project.id(), code, &update, &DefaultClock)
}

fn build_payment(project: &Project, label: &str, amount: i64) -> PaymentRecord {
    let milestone = MilestoneLabel::new(label).expect("valid milestone label");
    let planned = Money::new(amount).expect("valid amount");
    PaymentRecord::new(project.id(), milestone, planned, None, &DefaultClock)
}

fn build_task(project: &Project, title: &str) -> TaskRecord {
    let task_title = TaskTitle::new(title).expect("valid task title");
    TaskRecord::new(project.id(), task_title, None, None, None, &DefaultClock)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_projects_are_retrievable(repository: InMemoryProjectRepository) {
    let project = build_project("Mehta Apartment");
    repository
        .store_project(&project)
        .await
        .expect("store should succeed");

    let fetched = repository
        .find_project(project.id())
        .await
        .expect("lookup should succeed");

    assert_eq!(fetched, Some(project));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storing_the_same_project_twice_is_rejected(repository: InMemoryProjectRepository) {
    let project = build_project("Mehta Apartment");
    repository
        .store_project(&project)
        .await
        .expect("first store should succeed");

    let result = repository.store_project(&project).await;

    assert!(matches!(
        result,
        Err(ProjectRepositoryError::DuplicateProject(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stage_upserts_replace_by_project_and_code(repository: InMemoryProjectRepository) {
    let project = build_project("Mehta Apartment");
    repository
        .store_project(&project)
        .await
        .expect("store should succeed");

    let first = build_stage(&project, StageCode::Proposal, StageStatus::InProgress);
    repository
        .upsert_stage(&first)
        .await
        .expect("upsert should succeed");
    let replacement = build_stage(&project, StageCode::Proposal, StageStatus::Completed);
    repository
        .upsert_stage(&replacement)
        .await
        .expect("replacement upsert should succeed");

    let listed = repository
        .list_stages(project.id())
        .await
        .expect("listing should succeed");
    assert_eq!(listed.len(), 1);
    let record = listed.first().expect("one record should exist");
    assert_eq!(record.status(), StageStatus::Completed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_are_scoped_to_the_owning_project(repository: InMemoryProjectRepository) {
    let first = build_project("Mehta Apartment");
    let second = build_project("Kapoor Duplex");
    repository
        .store_project(&first)
        .await
        .expect("store should succeed");
    repository
        .store_project(&second)
        .await
        .expect("store should succeed");
    repository
        .store_payment(&build_payment(&first, "Advance", 100_000))
        .await
        .expect("store payment should succeed");
    repository
        .store_task(&build_task(&second, "Order laminates"))
        .await
        .expect("store task should succeed");

    let first_payments = repository
        .list_payments(first.id())
        .await
        .expect("listing should succeed");
    let second_payments = repository
        .list_payments(second.id())
        .await
        .expect("listing should succeed");
    let second_tasks = repository
        .list_tasks(second.id())
        .await
        .expect("listing should succeed");

    assert_eq!(first_payments.len(), 1);
    assert!(second_payments.is_empty());
    assert_eq!(second_tasks.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cascade_delete_removes_every_owned_record(repository: InMemoryProjectRepository) {
    let doomed = build_project("Mehta Apartment");
    let survivor = build_project("Kapoor Duplex");
    repository
        .store_project(&doomed)
        .await
        .expect("store should succeed");
    repository
        .store_project(&survivor)
        .await
        .expect("store should succeed");
    repository
        .upsert_stage(&build_stage(&doomed, StageCode::Lead, StageStatus::Completed))
        .await
        .expect("upsert should succeed");
    let payment = build_payment(&doomed, "Advance", 100_000);
    repository
        .store_payment(&payment)
        .await
        .expect("store payment should succeed");
    let task = build_task(&doomed, "Order laminates");
    repository
        .store_task(&task)
        .await
        .expect("store task should succeed");
    repository
        .store_payment(&build_payment(&survivor, "Advance", 50_000))
        .await
        .expect("store payment should succeed");

    repository
        .delete_project(doomed.id())
        .await
        .expect("delete should succeed");

    assert_eq!(
        repository
            .find_project(doomed.id())
            .await
            .expect("lookup should succeed"),
        None
    );
    assert_eq!(
        repository
            .find_payment(payment.id())
            .await
            .expect("lookup should succeed"),
        None
    );
    assert_eq!(
        repository
            .find_task(task.id())
            .await
            .expect("lookup should succeed"),
        None
    );
    assert!(matches!(
        repository.list_stages(doomed.id()).await,
        Err(ProjectRepositoryError::ProjectNotFound(_))
    ));

    // Unrelated projects keep their records.
    let remaining = repository
        .list_payments(survivor.id())
        .await
        .expect("listing should succeed");
    assert_eq!(remaining.len(), 1);
}
