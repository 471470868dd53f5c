//! Behaviour tests for stage record upsert and catalog-ordered listing.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;

use crate::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{Project, ProjectId, StageCode, StageStatus},
    ports::ProjectRepositoryError,
    services::{
        CreateProjectRequest, ProjectEngine, ProjectEngineError, UpsertStageRequest,
    },
};
use chrono::NaiveDate;
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
async fn upsert_creates_a_record_for_a_known_project(engine: TestEngine) {
    let project = seeded_project(&engine).await;

    let record = engine
        .stages()
        .upsert_stage(
            UpsertStageRequest::new(project.id(), StageCode::SiteVisit, StageStatus::InProgress)
                .with_start_date(
                    NaiveDate::from_ymd_opt(2024, 3, 11).expect("valid calendar date"),
                ),
        )
        .await
        .expect("stage upsert should succeed");

    assert_eq!(record.stage_code(), StageCode::SiteVisit);
    assert_eq!(record.status(), StageStatus::InProgress);
    assert!(record.start_date().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeating_an_identical_upsert_is_idempotent(engine: TestEngine) {
    let project = seeded_project(&engine).await;
    let request = UpsertStageRequest::new(project.id(), StageCode::Design, StageStatus::Completed)
        .with_remarks("3D renders approved");

    let first = engine
        .stages()
        .upsert_stage(request.clone())
        .await
        .expect("first upsert should succeed");
    let second = engine
        .stages()
        .upsert_stage(request)
        .await
        .expect("second upsert should succeed");

    assert_eq!(first, second);
    let listed = engine
        .stages()
        .list_stages(project.id())
        .await
        .expect("listing should succeed");
    assert_eq!(listed.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upsert_rejects_an_unknown_project(engine: TestEngine) {
    let result = engine
        .stages()
        .upsert_stage(UpsertStageRequest::new(
            ProjectId::new(),
            StageCode::Lead,
            StageStatus::InProgress,
        ))
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
async fn listing_follows_catalog_order_not_creation_order(engine: TestEngine) {
    let project = seeded_project(&engine).await;
    for code in [StageCode::Execution, StageCode::Lead, StageCode::Design] {
        engine
            .stages()
            .upsert_stage(UpsertStageRequest::new(
                project.id(),
                code,
                StageStatus::Completed,
            ))
            .await
            .expect("stage upsert should succeed");
    }

    let listed = engine
        .stages()
        .list_stages(project.id())
        .await
        .expect("listing should succeed");
    let codes: Vec<StageCode> = listed.iter().map(|record| record.stage_code()).collect();

    assert_eq!(
        codes,
        vec![StageCode::Lead, StageCode::Design, StageCode::Execution]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stages_may_complete_out_of_catalog_order(engine: TestEngine) {
    let project = seeded_project(&engine).await;

    // Handover completes while the site visit has no record at all.
    engine
        .stages()
        .upsert_stage(UpsertStageRequest::new(
            project.id(),
            StageCode::Handover,
            StageStatus::Completed,
        ))
        .await
        .expect("out-of-order completion is allowed");

    let progress = engine
        .current_progress(project.id())
        .await
        .expect("progress lookup should succeed");
    assert_eq!(progress, 10);
}
