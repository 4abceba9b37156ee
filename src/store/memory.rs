// ABOUTME: In-memory entity store backed by tokio RwLock maps
// ABOUTME: Provides read-your-writes row storage for a single-process deployment

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::entity::{Task, TaskResult, TaskStatus, Workflow};
use super::error::{Result, StoreError};
use super::Store;

/// Process-local store. Rows live for the lifetime of the process; the
/// service keeps no durable state beyond it.
#[derive(Default)]
pub struct MemoryStore {
    workflows: RwLock<HashMap<String, Workflow>>,
    tasks: RwLock<HashMap<String, Task>>,
    results: RwLock<HashMap<String, TaskResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn workflow_count(&self) -> usize {
        self.workflows.read().await.len()
    }

    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

fn sort_by_step(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.step_number
            .cmp(&b.step_number)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_workflow(&self, workflow: &Workflow) -> Result<()> {
        self.workflows
            .write()
            .await
            .insert(workflow.workflow_id.clone(), workflow.clone());
        Ok(())
    }

    async fn get_workflow(&self, workflow_id: &str) -> Result<Option<Workflow>> {
        Ok(self.workflows.read().await.get(workflow_id).cloned())
    }

    async fn update_workflow(&self, workflow: &Workflow) -> Result<()> {
        let mut workflows = self.workflows.write().await;
        if !workflows.contains_key(&workflow.workflow_id) {
            return Err(StoreError::not_found("workflow", &workflow.workflow_id));
        }
        workflows.insert(workflow.workflow_id.clone(), workflow.clone());
        Ok(())
    }

    async fn insert_task(&self, task: &Task) -> Result<()> {
        self.tasks
            .write()
            .await
            .insert(task.task_id.clone(), task.clone());
        Ok(())
    }

    async fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(task_id).cloned())
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.task_id) {
            return Err(StoreError::not_found("task", &task.task_id));
        }
        tasks.insert(task.task_id.clone(), task.clone());
        Ok(())
    }

    async fn list_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let mut matching: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| task.status == status)
            .cloned()
            .collect();
        sort_by_step(&mut matching);
        Ok(matching)
    }

    async fn list_tasks_by_workflow(&self, workflow_id: &str) -> Result<Vec<Task>> {
        let mut matching: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| task.workflow_id == workflow_id)
            .cloned()
            .collect();
        sort_by_step(&mut matching);
        Ok(matching)
    }

    async fn insert_result(&self, result: &TaskResult) -> Result<()> {
        self.results
            .write()
            .await
            .insert(result.result_id.clone(), result.clone());
        Ok(())
    }

    async fn get_result(&self, result_id: &str) -> Result<Option<TaskResult>> {
        Ok(self.results.read().await.get(result_id).cloned())
    }
}
