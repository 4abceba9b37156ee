// ABOUTME: Error types for the workflow execution engine
// ABOUTME: Defines validation, dispatch, and job failure variants

use thiserror::Error;

use crate::jobs::JobError;
use crate::store::{StoreError, TaskStatus};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Dependency not satisfied: task {task_id} depends on {dependency_id} ({status})")]
    DependencyNotSatisfied {
        task_id: String,
        dependency_id: String,
        status: TaskStatus,
    },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Job failed: {0}")]
    Job(#[from] JobError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
