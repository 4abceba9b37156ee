// ABOUTME: Polling dispatcher selecting the next runnable queued task
// ABOUTME: Honors dependency edges and step-number ordering, one task at a time

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info};

use super::error::{EngineError, Result};
use super::runner::TaskRunner;
use crate::store::{Store, Task, TaskStatus};

/// The single cooperative loop that drives all task execution. Polls the
/// store for queued tasks, picks the lowest step number whose dependency
/// (explicit edge or step order) is satisfied, and hands it to the runner.
pub struct Dispatcher {
    store: Arc<dyn Store>,
    runner: Arc<TaskRunner>,
    poll_interval: Duration,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn Store>, runner: Arc<TaskRunner>, poll_interval: Duration) -> Self {
        Self {
            store,
            runner,
            poll_interval,
        }
    }

    /// Run forever. Task failures are logged and absorbed; the loop itself
    /// only pauses, never stops.
    pub async fn run(&self) {
        info!(
            "Dispatcher started (poll interval {:?})",
            self.poll_interval
        );
        loop {
            if let Err(err) = self.tick().await {
                error!("Dispatcher iteration failed: {}", err);
            }
            sleep(self.poll_interval).await;
        }
    }

    /// One dispatch iteration: run the first unblocked queued task, if any.
    /// Returns the id of the task that ran. Job failures settle the task and
    /// workflow rows inside the runner and are not iteration failures.
    pub async fn tick(&self) -> Result<Option<String>> {
        let mut queued = self.store.list_tasks_by_status(TaskStatus::Queued).await?;
        if queued.is_empty() {
            return Ok(None);
        }

        queued.sort_by_key(|task| task.step_number);

        for candidate in &queued {
            if self.is_blocked(candidate).await? {
                continue;
            }

            debug!(
                "Dispatching task {} (step {}, type {})",
                candidate.task_id, candidate.step_number, candidate.task_type
            );
            if let Err(err) = self.runner.run(candidate).await {
                match err {
                    EngineError::Store(err) => return Err(EngineError::Store(err)),
                    other => error!("Task {} failed: {}", candidate.task_id, other),
                }
            }
            return Ok(Some(candidate.task_id.clone()));
        }

        debug!("All {} queued task(s) are blocked", queued.len());
        Ok(None)
    }

    /// A task with an explicit dependency waits for that dependency to
    /// complete; a failed dependency blocks it permanently. A task without
    /// one waits for every earlier-step sibling to leave the queue.
    async fn is_blocked(&self, task: &Task) -> Result<bool> {
        match &task.depends_on {
            Some(dependency_id) => {
                let dependency = self
                    .store
                    .get_task(dependency_id)
                    .await?
                    .ok_or_else(|| EngineError::TaskNotFound(dependency_id.clone()))?;
                Ok(matches!(
                    dependency.status,
                    TaskStatus::Queued | TaskStatus::InProgress | TaskStatus::Failed
                ))
            }
            None => {
                let siblings = self
                    .store
                    .list_tasks_by_workflow(&task.workflow_id)
                    .await?;
                Ok(siblings.iter().any(|sibling| {
                    sibling.step_number < task.step_number && sibling.status.is_pending()
                }))
            }
        }
    }
}
