// ABOUTME: Entity store module for workflow, task, and result rows
// ABOUTME: Exposes the Store trait and the in-memory backend implementation

pub mod entity;
pub mod error;
pub mod memory;

pub use entity::{Task, TaskResult, TaskStatus, Workflow, WorkflowStatus};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Row-level persistence for the three entities.
///
/// Backends must provide read-your-writes consistency within a process: a
/// lookup issued after `update_*` returns observes the write. Each row is
/// mutated by exactly one component, so no multi-row transactions are
/// required.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_workflow(&self, workflow: &Workflow) -> Result<()>;
    async fn get_workflow(&self, workflow_id: &str) -> Result<Option<Workflow>>;
    async fn update_workflow(&self, workflow: &Workflow) -> Result<()>;

    async fn insert_task(&self, task: &Task) -> Result<()>;
    async fn get_task(&self, task_id: &str) -> Result<Option<Task>>;
    async fn update_task(&self, task: &Task) -> Result<()>;

    /// All tasks currently in the given status, ordered by step number.
    async fn list_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>>;

    /// All tasks belonging to the given workflow, ordered by step number.
    async fn list_tasks_by_workflow(&self, workflow_id: &str) -> Result<Vec<Task>>;

    async fn insert_result(&self, result: &TaskResult) -> Result<()>;
    async fn get_result(&self, result_id: &str) -> Result<Option<TaskResult>>;
}
