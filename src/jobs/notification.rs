// ABOUTME: Notification job announcing workflow progress
// ABOUTME: Logs a delivery referencing the upstream input and returns a text receipt

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::error::Result;
use super::{Job, JobContext};
use crate::store::Task;

pub struct NotificationJob;

#[async_trait]
impl Job for NotificationJob {
    fn task_type(&self) -> &'static str {
        "notification"
    }

    async fn run(&self, task: &mut Task, _ctx: &JobContext) -> Result<Value> {
        let message = match &task.input {
            Some(input) => format!(
                "Notification sent for workflow {} with upstream result: {}",
                task.workflow_id, input
            ),
            None => format!("Notification sent for workflow {}", task.workflow_id),
        };

        info!("Task {}: {}", task.task_id, message);

        let output = Value::String(message);
        task.output = Some(serde_json::to_string(&output)?);
        Ok(output)
    }
}
