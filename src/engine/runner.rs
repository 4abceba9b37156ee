// ABOUTME: Task runner driving a single task through its lifecycle
// ABOUTME: Threads dependency outputs, invokes jobs, persists results, triggers reconciliation

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument};

use super::error::{EngineError, Result};
use super::reconciler::WorkflowReconciler;
use crate::jobs::{JobContext, JobRegistry};
use crate::store::{Store, Task, TaskResult, TaskStatus};

/// Executes one queued task end to end:
/// `queued → in_progress → {completed, failed}`, followed by workflow
/// reconciliation on either path.
pub struct TaskRunner {
    store: Arc<dyn Store>,
    registry: Arc<JobRegistry>,
    reconciler: WorkflowReconciler,
    job_context: JobContext,
}

impl TaskRunner {
    pub fn new(store: Arc<dyn Store>, registry: Arc<JobRegistry>) -> Self {
        Self {
            reconciler: WorkflowReconciler::new(store.clone()),
            job_context: JobContext::new(store.clone()),
            store,
            registry,
        }
    }

    /// Run a queued task. The job error, if any, is re-surfaced to the
    /// caller after the task and workflow rows have been settled.
    #[instrument(skip(self, task), fields(task_id = %task.task_id, task_type = %task.task_type))]
    pub async fn run(&self, task: &Task) -> Result<()> {
        let mut task = task.clone();

        task.status = TaskStatus::InProgress;
        task.progress = Some("starting job...".to_string());
        self.store.update_task(&task).await?;

        info!(
            "Running task {} (step {}) of workflow {}",
            task.task_id, task.step_number, task.workflow_id
        );

        let outcome = self.execute(&mut task).await;

        match &outcome {
            Ok(value) => {
                let data = match value {
                    Value::Null => "{}".to_string(),
                    other => serde_json::to_string(other)?,
                };
                let result = TaskResult::new(&task.task_id, data);
                self.store.insert_result(&result).await?;

                task.result_id = Some(result.result_id.clone());
                task.status = TaskStatus::Completed;
                task.progress = None;
                self.store.update_task(&task).await?;

                info!("Task {} completed", task.task_id);
            }
            Err(err) => {
                // Jobs record their own error envelopes; only fill the side
                // channel when nothing did (engine-level failures).
                if task.output.is_none() {
                    let envelope = serde_json::json!({ "error": err.to_string() });
                    task.output = Some(envelope.to_string());
                }
                task.status = TaskStatus::Failed;
                task.progress = None;
                self.store.update_task(&task).await?;

                error!("Task {} failed: {}", task.task_id, err);
            }
        }

        self.reconciler.reconcile(&task.workflow_id).await?;

        outcome.map(|_| ())
    }

    async fn execute(&self, task: &mut Task) -> Result<Value> {
        if let Some(dependency_id) = task.depends_on.clone() {
            let dependency = self
                .store
                .get_task(&dependency_id)
                .await?
                .ok_or_else(|| EngineError::TaskNotFound(dependency_id.clone()))?;

            // The dispatcher should never hand us a task whose dependency is
            // unfinished; check anyway.
            if dependency.status != TaskStatus::Completed {
                return Err(EngineError::DependencyNotSatisfied {
                    task_id: task.task_id.clone(),
                    dependency_id,
                    status: dependency.status,
                });
            }

            task.input = dependency.output.clone();
            self.store.update_task(task).await?;
        }

        let job = self
            .registry
            .get(&task.task_type)
            .ok_or_else(|| EngineError::UnknownTaskType(task.task_type.clone()))?;

        let value = job.run(task, &self.job_context).await?;
        Ok(value)
    }
}
