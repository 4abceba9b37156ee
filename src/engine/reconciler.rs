// ABOUTME: Workflow reconciler recomputing workflow state from task states
// ABOUTME: Writes the aggregated final result on the first terminal transition

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::error::{EngineError, Result};
use crate::store::{Store, Task, TaskStatus, Workflow, WorkflowStatus};

/// Recomputes a workflow's status from its tasks after every task
/// transition, and freezes the aggregated `finalResult` the first time the
/// workflow turns terminal.
pub struct WorkflowReconciler {
    store: Arc<dyn Store>,
}

impl WorkflowReconciler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn reconcile(&self, workflow_id: &str) -> Result<Workflow> {
        let mut workflow = self
            .store
            .get_workflow(workflow_id)
            .await?
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?;
        let tasks = self.store.list_tasks_by_workflow(workflow_id).await?;

        let all_completed =
            !tasks.is_empty() && tasks.iter().all(|t| t.status == TaskStatus::Completed);
        let any_failed = tasks.iter().any(|t| t.status == TaskStatus::Failed);
        let any_started = tasks.iter().any(|t| t.status != TaskStatus::Queued);

        workflow.status = if any_failed {
            WorkflowStatus::Failed
        } else if all_completed {
            WorkflowStatus::Completed
        } else if any_started {
            WorkflowStatus::InProgress
        } else {
            WorkflowStatus::Initial
        };

        // The aggregate is written exactly once, on the first terminal
        // transition. A report-generation task that already populated
        // final_result (a richer form) is left untouched.
        if workflow.status.is_terminal() && workflow.final_result.is_none() {
            let aggregate = aggregate_result(&workflow, &tasks);
            workflow.final_result = Some(serde_json::to_string(&aggregate)?);
            info!(
                "Workflow {} is {}; final result frozen",
                workflow.workflow_id, workflow.status
            );
        } else {
            debug!(
                "Workflow {} reconciled to {}",
                workflow.workflow_id, workflow.status
            );
        }

        self.store.update_workflow(&workflow).await?;
        Ok(workflow)
    }
}

/// The plain aggregate envelope: every task in step order with its parsed
/// output or extracted error.
fn aggregate_result(workflow: &Workflow, tasks: &[Task]) -> Value {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|t| t.step_number);

    let entries: Vec<Value> = ordered
        .iter()
        .map(|task| {
            let mut entry = Map::new();
            entry.insert("taskId".to_string(), json!(task.task_id));
            entry.insert("type".to_string(), json!(task.task_type));
            entry.insert("stepNumber".to_string(), json!(task.step_number));
            entry.insert("status".to_string(), json!(task.status));
            match task.status {
                TaskStatus::Completed => {
                    if let Some(output) = task.output_value() {
                        entry.insert("output".to_string(), output);
                    }
                }
                TaskStatus::Failed => {
                    let (message, preserved) = task.failure_details();
                    entry.insert("error".to_string(), json!(message));
                    if let Some(raw) = preserved {
                        entry.insert("output".to_string(), raw);
                    }
                }
                _ => {}
            }
            Value::Object(entry)
        })
        .collect();

    json!({
        "workflowId": workflow.workflow_id,
        "status": workflow.status,
        "tasks": entries,
        "generatedAt": Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn seeded(
        statuses: &[(u32, &str, TaskStatus, Option<&str>)],
    ) -> (WorkflowReconciler, Arc<MemoryStore>, Workflow) {
        let store = Arc::new(MemoryStore::new());
        let workflow = Workflow::new("client-1");
        store.insert_workflow(&workflow).await.unwrap();

        for (step, task_type, status, output) in statuses {
            let mut task = Task::new(&workflow, *task_type, *step, "{}");
            task.status = *status;
            task.output = output.map(str::to_string);
            store.insert_task(&task).await.unwrap();
        }

        (WorkflowReconciler::new(store.clone()), store, workflow)
    }

    #[tokio::test]
    async fn test_all_queued_stays_initial() {
        let (reconciler, _, workflow) = seeded(&[
            (1, "polygonArea", TaskStatus::Queued, None),
            (2, "analysis", TaskStatus::Queued, None),
        ])
        .await;

        let reconciled = reconciler.reconcile(&workflow.workflow_id).await.unwrap();
        assert_eq!(reconciled.status, WorkflowStatus::Initial);
        assert!(reconciled.final_result.is_none());
    }

    #[tokio::test]
    async fn test_partial_progress_is_in_progress() {
        let (reconciler, _, workflow) = seeded(&[
            (1, "polygonArea", TaskStatus::Completed, Some(r#"{"area": 1.0}"#)),
            (2, "analysis", TaskStatus::Queued, None),
        ])
        .await;

        let reconciled = reconciler.reconcile(&workflow.workflow_id).await.unwrap();
        assert_eq!(reconciled.status, WorkflowStatus::InProgress);
        assert!(reconciled.final_result.is_none());
    }

    #[tokio::test]
    async fn test_all_completed_freezes_aggregate() {
        let (reconciler, _, workflow) = seeded(&[
            (2, "analysis", TaskStatus::Completed, Some(r#"{"country": "Brazil"}"#)),
            (1, "polygonArea", TaskStatus::Completed, Some(r#"{"area": 1.0}"#)),
        ])
        .await;

        let reconciled = reconciler.reconcile(&workflow.workflow_id).await.unwrap();
        assert_eq!(reconciled.status, WorkflowStatus::Completed);

        let aggregate: Value =
            serde_json::from_str(reconciled.final_result.as_deref().unwrap()).unwrap();
        assert_eq!(aggregate["status"], "completed");
        let steps: Vec<u64> = aggregate["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["stepNumber"].as_u64().unwrap())
            .collect();
        assert_eq!(steps, vec![1, 2]);
        assert_eq!(aggregate["tasks"][1]["output"]["country"], "Brazil");
    }

    #[tokio::test]
    async fn test_failed_task_fails_workflow_with_queued_dependent() {
        let (reconciler, _, workflow) = seeded(&[
            (1, "polygonArea", TaskStatus::Completed, Some(r#"{"area": 1.0}"#)),
            (2, "analysis", TaskStatus::Failed, Some(r#"{"error": "boom"}"#)),
            (3, "notification", TaskStatus::Queued, None),
        ])
        .await;

        let reconciled = reconciler.reconcile(&workflow.workflow_id).await.unwrap();
        assert_eq!(reconciled.status, WorkflowStatus::Failed);

        let aggregate: Value =
            serde_json::from_str(reconciled.final_result.as_deref().unwrap()).unwrap();
        assert_eq!(aggregate["tasks"][1]["error"], "boom");
        assert_eq!(aggregate["tasks"][2]["status"], "queued");
        assert!(aggregate["tasks"][2].get("output").is_none());
    }

    #[tokio::test]
    async fn test_existing_final_result_preserved() {
        let (reconciler, store, mut workflow) = seeded(&[(
            1,
            "polygonArea",
            TaskStatus::Completed,
            Some(r#"{"area": 1.0}"#),
        )])
        .await;

        workflow.final_result = Some(r#"{"richer": "report"}"#.to_string());
        store.update_workflow(&workflow).await.unwrap();

        let reconciled = reconciler.reconcile(&workflow.workflow_id).await.unwrap();
        assert_eq!(reconciled.status, WorkflowStatus::Completed);
        assert_eq!(
            reconciled.final_result.as_deref(),
            Some(r#"{"richer": "report"}"#)
        );
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (reconciler, store, workflow) = seeded(&[
            (1, "polygonArea", TaskStatus::Completed, Some(r#"{"area": 1.0}"#)),
            (2, "analysis", TaskStatus::Failed, Some(r#"{"error": "boom"}"#)),
        ])
        .await;

        let first = reconciler.reconcile(&workflow.workflow_id).await.unwrap();
        let second = reconciler.reconcile(&workflow.workflow_id).await.unwrap();

        assert_eq!(first, second);
        let stored = store
            .get_workflow(&workflow.workflow_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, first);
    }
}
