//! Diesel schema for project lifecycle persistence.

diesel::table! {
    /// Renovation project aggregate roots.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Project name.
        #[max_length = 255]
        name -> Varchar,
        /// Delivery stage pointer.
        #[max_length = 50]
        current_stage -> Varchar,
        /// Commercial status.
        #[max_length = 50]
        status -> Varchar,
        /// Contract value in minor currency units.
        total_value -> Int8,
        /// Optional project category.
        #[max_length = 255]
        category -> Nullable<Varchar>,
        /// Optional property details.
        property_details -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-stage progress records, one row per project and stage code.
    project_stages (project_id, stage_code) {
        /// Owning project identifier.
        project_id -> Uuid,
        /// Delivery stage code.
        #[max_length = 50]
        stage_code -> Varchar,
        /// Completion status.
        #[max_length = 50]
        status -> Varchar,
        /// Optional start date.
        start_date -> Nullable<Date>,
        /// Optional end date.
        end_date -> Nullable<Date>,
        /// Optional free-form remarks.
        remarks -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Payment milestone records.
    project_payments (id) {
        /// Payment identifier.
        id -> Uuid,
        /// Owning project identifier.
        project_id -> Uuid,
        /// Milestone label.
        #[max_length = 255]
        milestone -> Varchar,
        /// Planned amount in minor currency units.
        amount -> Int8,
        /// Collected amount in minor currency units, when it differs.
        actual_amount -> Nullable<Int8>,
        /// Collection status.
        #[max_length = 50]
        status -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Optional collection instant.
        collected_date -> Nullable<Timestamptz>,
        /// Optional invoice number.
        #[max_length = 255]
        invoice_number -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Execution task records.
    project_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project identifier.
        project_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Optional assignee payload (person reference or inline name).
        assigned_to -> Nullable<Jsonb>,
        /// Workflow status.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(project_stages -> projects (project_id));
diesel::joinable!(project_payments -> projects (project_id));
diesel::joinable!(project_tasks -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(
    projects,
    project_stages,
    project_payments,
    project_tasks,
);
