// ABOUTME: Error types for job implementations
// ABOUTME: Defines the failure variants a job can surface to the task runner

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Report requested before preceding tasks finished: task {0} is still pending")]
    PrematureReport(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, JobError>;
