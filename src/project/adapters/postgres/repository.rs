//! `PostgreSQL` repository implementation for project lifecycle storage.

use super::{
    models::{PaymentRow, ProjectRow, StageRow, TaskRow},
    schema::{project_payments, project_stages, project_tasks, projects},
};
use crate::project::{
    domain::{
        MilestoneLabel, Money, PaymentId, PaymentRecord, PaymentStatus, PersistedPaymentData,
        PersistedProjectData, PersistedStageData, PersistedTaskData, Project, ProjectId,
        ProjectName, ProjectStatus, StageCode, StageRecord, StageStatus, TaskRecord, TaskRecordId,
        TaskStatus, TaskTitle,
    },
    ports::{
        PaymentRepository, ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult,
        StageRepository, TaskRepository,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by project adapters.
pub type ProjectPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed project repository.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: ProjectPgPool,
}

impl PostgresProjectRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ProjectPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProjectRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProjectRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProjectRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProjectRepositoryError::persistence)?
    }
}

impl From<DieselError> for ProjectRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

fn project_exists(
    connection: &mut PgConnection,
    project_id: ProjectId,
) -> ProjectRepositoryResult<bool> {
    let found = projects::table
        .filter(projects::id.eq(project_id.into_inner()))
        .select(projects::id)
        .first::<uuid::Uuid>(connection)
        .optional()?;
    Ok(found.is_some())
}

fn ensure_project(
    connection: &mut PgConnection,
    project_id: ProjectId,
) -> ProjectRepositoryResult<()> {
    if project_exists(connection, project_id)? {
        Ok(())
    } else {
        Err(ProjectRepositoryError::ProjectNotFound(project_id))
    }
}

fn map_foreign_key(err: DieselError, project_id: ProjectId) -> ProjectRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            ProjectRepositoryError::ProjectNotFound(project_id)
        }
        other => ProjectRepositoryError::persistence(other),
    }
}

fn to_project_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id().into_inner(),
        name: project.name().as_str().to_owned(),
        current_stage: project.current_stage().as_str().to_owned(),
        status: project.status().as_str().to_owned(),
        total_value: project.total_value().minor_units(),
        category: project.category().map(str::to_owned),
        property_details: project.property_details().map(str::to_owned),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn row_to_project(row: ProjectRow) -> ProjectRepositoryResult<Project> {
    let name = ProjectName::new(row.name).map_err(ProjectRepositoryError::persistence)?;
    let current_stage = StageCode::try_from(row.current_stage.as_str())
        .map_err(ProjectRepositoryError::persistence)?;
    let status = ProjectStatus::try_from(row.status.as_str())
        .map_err(ProjectRepositoryError::persistence)?;
    let total_value =
        Money::new(row.total_value).map_err(ProjectRepositoryError::persistence)?;

    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        name,
        current_stage,
        status,
        total_value,
        category: row.category,
        property_details: row.property_details,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn to_stage_row(record: &StageRecord) -> StageRow {
    StageRow {
        project_id: record.project_id().into_inner(),
        stage_code: record.stage_code().as_str().to_owned(),
        status: record.status().as_str().to_owned(),
        start_date: record.start_date(),
        end_date: record.end_date(),
        remarks: record.remarks().map(str::to_owned),
        created_at: record.created_at(),
        updated_at: record.updated_at(),
    }
}

fn row_to_stage(row: StageRow) -> ProjectRepositoryResult<StageRecord> {
    let stage_code = StageCode::try_from(row.stage_code.as_str())
        .map_err(ProjectRepositoryError::persistence)?;
    let status = StageStatus::try_from(row.status.as_str())
        .map_err(ProjectRepositoryError::persistence)?;

    Ok(StageRecord::from_persisted(PersistedStageData {
        project_id: ProjectId::from_uuid(row.project_id),
        stage_code,
        status,
        start_date: row.start_date,
        end_date: row.end_date,
        remarks: row.remarks,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn to_payment_row(record: &PaymentRecord) -> PaymentRow {
    PaymentRow {
        id: record.id().into_inner(),
        project_id: record.project_id().into_inner(),
        milestone: record.milestone().as_str().to_owned(),
        amount: record.amount().minor_units(),
        actual_amount: record.actual_amount().map(Money::minor_units),
        status: record.status().as_str().to_owned(),
        due_date: record.due_date(),
        collected_date: record.collected_date(),
        invoice_number: record.invoice_number().map(str::to_owned),
        created_at: record.created_at(),
        updated_at: record.updated_at(),
    }
}

fn row_to_payment(row: PaymentRow) -> ProjectRepositoryResult<PaymentRecord> {
    let milestone =
        MilestoneLabel::new(row.milestone).map_err(ProjectRepositoryError::persistence)?;
    let amount = Money::new(row.amount).map_err(ProjectRepositoryError::persistence)?;
    let actual_amount = row
        .actual_amount
        .map(Money::new)
        .transpose()
        .map_err(ProjectRepositoryError::persistence)?;
    let status = PaymentStatus::try_from(row.status.as_str())
        .map_err(ProjectRepositoryError::persistence)?;

    Ok(PaymentRecord::from_persisted(PersistedPaymentData {
        id: PaymentId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        milestone,
        amount,
        actual_amount,
        status,
        due_date: row.due_date,
        collected_date: row.collected_date,
        invoice_number: row.invoice_number,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn to_task_row(record: &TaskRecord) -> ProjectRepositoryResult<TaskRow> {
    let assigned_to = record
        .assigned_to()
        .map(serde_json::to_value)
        .transpose()
        .map_err(ProjectRepositoryError::persistence)?;

    Ok(TaskRow {
        id: record.id().into_inner(),
        project_id: record.project_id().into_inner(),
        title: record.title().as_str().to_owned(),
        description: record.description().map(str::to_owned),
        due_date: record.due_date(),
        assigned_to,
        status: record.status().as_str().to_owned(),
        created_at: record.created_at(),
        updated_at: record.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> ProjectRepositoryResult<TaskRecord> {
    let title = TaskTitle::new(row.title).map_err(ProjectRepositoryError::persistence)?;
    let assigned_to = row
        .assigned_to
        .map(serde_json::from_value)
        .transpose()
        .map_err(ProjectRepositoryError::persistence)?;
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(ProjectRepositoryError::persistence)?;

    Ok(TaskRecord::from_persisted(PersistedTaskData {
        id: TaskRecordId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        title,
        description: row.description,
        due_date: row.due_date,
        assigned_to,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

#[async_trait]
impl StageRepository for PostgresProjectRepository {
    async fn upsert_stage(&self, record: &StageRecord) -> ProjectRepositoryResult<()> {
        let project_id = record.project_id();
        let row = to_stage_row(record);

        self.run_blocking(move |connection| {
            // The pre-check improves semantic error reporting; the foreign
            // key still enforces integrity in the TOCTOU window between
            // check and write.
            ensure_project(connection, project_id)?;

            diesel::insert_into(project_stages::table)
                .values(&row)
                .on_conflict((project_stages::project_id, project_stages::stage_code))
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(|err| map_foreign_key(err, project_id))?;
            Ok(())
        })
        .await
    }

    async fn find_stage(
        &self,
        project_id: ProjectId,
        stage_code: StageCode,
    ) -> ProjectRepositoryResult<Option<StageRecord>> {
        self.run_blocking(move |connection| {
            let row = project_stages::table
                .filter(project_stages::project_id.eq(project_id.into_inner()))
                .filter(project_stages::stage_code.eq(stage_code.as_str()))
                .select(StageRow::as_select())
                .first::<StageRow>(connection)
                .optional()?;
            row.map(row_to_stage).transpose()
        })
        .await
    }

    async fn list_stages(
        &self,
        project_id: ProjectId,
    ) -> ProjectRepositoryResult<Vec<StageRecord>> {
        self.run_blocking(move |connection| {
            ensure_project(connection, project_id)?;
            let rows = project_stages::table
                .filter(project_stages::project_id.eq(project_id.into_inner()))
                .select(StageRow::as_select())
                .load::<StageRow>(connection)?;
            let mut records = rows
                .into_iter()
                .map(row_to_stage)
                .collect::<ProjectRepositoryResult<Vec<_>>>()?;
            records.sort_by_key(|record| record.stage_code().ordinal());
            Ok(records)
        })
        .await
    }
}

#[async_trait]
impl PaymentRepository for PostgresProjectRepository {
    async fn store_payment(&self, record: &PaymentRecord) -> ProjectRepositoryResult<()> {
        let project_id = record.project_id();
        let row = to_payment_row(record);

        self.run_blocking(move |connection| {
            ensure_project(connection, project_id)?;
            diesel::insert_into(project_payments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_foreign_key(err, project_id))?;
            Ok(())
        })
        .await
    }

    async fn update_payment(&self, record: &PaymentRecord) -> ProjectRepositoryResult<()> {
        let payment_id = record.id();
        let row = to_payment_row(record);

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                project_payments::table.filter(project_payments::id.eq(payment_id.into_inner())),
            )
            .set(&row)
            .execute(connection)?;
            if updated == 0 {
                return Err(ProjectRepositoryError::PaymentNotFound(payment_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_payment(
        &self,
        id: PaymentId,
    ) -> ProjectRepositoryResult<Option<PaymentRecord>> {
        self.run_blocking(move |connection| {
            let row = project_payments::table
                .filter(project_payments::id.eq(id.into_inner()))
                .select(PaymentRow::as_select())
                .first::<PaymentRow>(connection)
                .optional()?;
            row.map(row_to_payment).transpose()
        })
        .await
    }

    async fn list_payments(
        &self,
        project_id: ProjectId,
    ) -> ProjectRepositoryResult<Vec<PaymentRecord>> {
        self.run_blocking(move |connection| {
            ensure_project(connection, project_id)?;
            let rows = project_payments::table
                .filter(project_payments::project_id.eq(project_id.into_inner()))
                .order(project_payments::created_at.asc())
                .select(PaymentRow::as_select())
                .load::<PaymentRow>(connection)?;
            rows.into_iter().map(row_to_payment).collect()
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresProjectRepository {
    async fn store_task(&self, record: &TaskRecord) -> ProjectRepositoryResult<()> {
        let project_id = record.project_id();
        let row = to_task_row(record)?;

        self.run_blocking(move |connection| {
            ensure_project(connection, project_id)?;
            diesel::insert_into(project_tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_foreign_key(err, project_id))?;
            Ok(())
        })
        .await
    }

    async fn update_task(&self, record: &TaskRecord) -> ProjectRepositoryResult<()> {
        let task_id = record.id();
        let row = to_task_row(record)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                project_tasks::table.filter(project_tasks::id.eq(task_id.into_inner())),
            )
            .set(&row)
            .execute(connection)?;
            if updated == 0 {
                return Err(ProjectRepositoryError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskRecordId) -> ProjectRepositoryResult<Option<TaskRecord>> {
        self.run_blocking(move |connection| {
            let row = project_tasks::table
                .filter(project_tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_tasks(
        &self,
        project_id: ProjectId,
    ) -> ProjectRepositoryResult<Vec<TaskRecord>> {
        self.run_blocking(move |connection| {
            ensure_project(connection, project_id)?;
            let rows = project_tasks::table
                .filter(project_tasks::project_id.eq(project_id.into_inner()))
                .order(project_tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn store_project(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let project_id = project.id();
        let row = to_project_row(project);

        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ProjectRepositoryError::DuplicateProject(project_id)
                    }
                    other => ProjectRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let project_id = project.id();
        let row = to_project_row(project);

        self.run_blocking(move |connection| {
            let updated =
                diesel::update(projects::table.filter(projects::id.eq(project_id.into_inner())))
                    .set(&row)
                    .execute(connection)?;
            if updated == 0 {
                return Err(ProjectRepositoryError::ProjectNotFound(project_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> ProjectRepositoryResult<()> {
        self.run_blocking(move |connection| {
            // The transaction makes the cascade all-or-nothing: a failure at
            // any step rolls back every child deletion.
            connection.transaction::<_, ProjectRepositoryError, _>(|transaction| {
                let raw_id = id.into_inner();
                diesel::delete(
                    project_stages::table.filter(project_stages::project_id.eq(raw_id)),
                )
                .execute(transaction)?;
                diesel::delete(
                    project_payments::table.filter(project_payments::project_id.eq(raw_id)),
                )
                .execute(transaction)?;
                diesel::delete(
                    project_tasks::table.filter(project_tasks::project_id.eq(raw_id)),
                )
                .execute(transaction)?;
                let deleted =
                    diesel::delete(projects::table.filter(projects::id.eq(raw_id)))
                        .execute(transaction)?;
                if deleted == 0 {
                    return Err(ProjectRepositoryError::ProjectNotFound(id));
                }
                Ok(())
            })
        })
        .await
    }
}
