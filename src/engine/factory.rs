// ABOUTME: Workflow factory materializing definitions into persisted rows
// ABOUTME: Validates definitions against the registry and wires dependency edges

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;

use super::error::{EngineError, Result};
use crate::jobs::JobRegistry;
use crate::parser::WorkflowDefinition;
use crate::store::{Store, Task, Workflow};

/// Turns a validated definition plus a client payload into one workflow row
/// and its queued task rows.
pub struct WorkflowFactory {
    store: Arc<dyn Store>,
    registry: Arc<JobRegistry>,
}

impl WorkflowFactory {
    pub fn new(store: Arc<dyn Store>, registry: Arc<JobRegistry>) -> Self {
        Self { store, registry }
    }

    /// Validate the definition in full. Nothing is persisted until this
    /// passes, so a rejected definition leaves zero rows behind.
    pub fn validate(&self, definition: &WorkflowDefinition) -> Result<()> {
        if definition.name.trim().is_empty() {
            return Err(EngineError::InvalidWorkflow(
                "definition has no name".to_string(),
            ));
        }
        if definition.steps.is_empty() {
            return Err(EngineError::InvalidWorkflow(
                "definition declares no steps".to_string(),
            ));
        }

        let mut seen_steps = HashSet::new();
        for step in &definition.steps {
            if step.step_number == 0 {
                return Err(EngineError::InvalidWorkflow(format!(
                    "step number must be positive (task type {})",
                    step.task_type
                )));
            }
            if !seen_steps.insert(step.step_number) {
                return Err(EngineError::InvalidWorkflow(format!(
                    "duplicate step number {}",
                    step.step_number
                )));
            }
            if !self.registry.contains(&step.task_type) {
                return Err(EngineError::InvalidWorkflow(format!(
                    "unknown task type '{}' in step {}",
                    step.task_type, step.step_number
                )));
            }
        }

        for step in &definition.steps {
            if let Some(dependency) = step.depends_on {
                if definition.step(dependency).is_none() {
                    return Err(EngineError::InvalidWorkflow(format!(
                        "step {} depends on unknown step {}",
                        step.step_number, dependency
                    )));
                }
                // A dependency must point at an earlier step; anything else
                // (self, forward) can never be dispatched.
                if dependency >= step.step_number {
                    return Err(EngineError::InvalidWorkflow(format!(
                        "step {} must depend on an earlier step, not {}",
                        step.step_number, dependency
                    )));
                }
            }
        }

        Ok(())
    }

    /// Create and persist the workflow and its tasks, resolving `dependsOn`
    /// step numbers into task-id references once all tasks have identities.
    pub async fn create(
        &self,
        definition: &WorkflowDefinition,
        client_id: &str,
        geo_json: &str,
    ) -> Result<Workflow> {
        self.validate(definition)?;

        let workflow = Workflow::new(client_id);
        self.store.insert_workflow(&workflow).await?;

        let mut tasks = Vec::with_capacity(definition.steps.len());
        for step in &definition.steps {
            let task = Task::new(&workflow, &step.task_type, step.step_number, geo_json);
            self.store.insert_task(&task).await?;
            tasks.push(task);
        }

        let id_by_step: HashMap<u32, String> = tasks
            .iter()
            .map(|task| (task.step_number, task.task_id.clone()))
            .collect();

        for (step, task) in definition.steps.iter().zip(tasks.iter_mut()) {
            if let Some(dependency) = step.depends_on {
                task.depends_on = id_by_step.get(&dependency).cloned();
                self.store.update_task(task).await?;
            }
        }

        info!(
            "Workflow {} created from '{}' with {} task(s) for client {}",
            workflow.workflow_id,
            definition.name,
            tasks.len(),
            client_id
        );

        Ok(workflow)
    }
}
