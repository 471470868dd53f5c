//! Application services for project lifecycle orchestration.

mod engine;
mod error;
mod locks;
mod payment_ledger;
mod stage_tracker;
mod task_board;

pub use engine::{CreateProjectRequest, ProjectEngine};
pub use error::{ProjectEngineError, ProjectEngineResult};
pub use locks::ProjectLockRegistry;
pub use payment_ledger::{CreatePaymentRequest, PaymentLedger, UpdatePaymentStatusRequest};
pub use stage_tracker::{StageTracker, UpsertStageRequest};
pub use task_board::{CreateTaskRequest, TaskBoard};
