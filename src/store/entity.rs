// ABOUTME: Persistent entity rows for workflows, tasks, and task results
// ABOUTME: Defines status enums and parse-on-read helpers for serialized payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initial,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// A task that has neither finished nor failed still occupies the queue.
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Queued | TaskStatus::InProgress)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::Initial => write!(f, "initial"),
            WorkflowStatus::InProgress => write!(f, "in_progress"),
            WorkflowStatus::Completed => write!(f, "completed"),
            WorkflowStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Queued => write!(f, "queued"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One instantiated workflow: a persistent ordered collection of tasks
/// sharing a client id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: String,
    pub client_id: String,
    pub status: WorkflowStatus,
    /// Serialized aggregate, present only once the workflow is terminal.
    pub final_result: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            workflow_id: Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            status: WorkflowStatus::Initial,
            final_result: None,
            created_at: Utc::now(),
        }
    }
}

/// One unit of work inside a workflow. References its workflow and its
/// optional dependency by id only; relations are hydrated through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub client_id: String,
    pub workflow_id: String,
    pub task_type: String,
    pub step_number: u32,
    pub status: TaskStatus,
    /// Task id of the dependency within the same workflow, if any.
    pub depends_on: Option<String>,
    /// The original client payload, opaque to the engine.
    pub geo_json: String,
    /// Populated from the dependency's output at dispatch time.
    pub input: Option<String>,
    /// Serialized job output, or a serialized error envelope on failure.
    pub output: Option<String>,
    /// Free-form status text while in progress, null otherwise.
    pub progress: Option<String>,
    /// Set iff the task completed; references the result row.
    pub result_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        workflow: &Workflow,
        task_type: impl Into<String>,
        step_number: u32,
        geo_json: impl Into<String>,
    ) -> Self {
        Self {
            task_id: Uuid::new_v4().to_string(),
            client_id: workflow.client_id.clone(),
            workflow_id: workflow.workflow_id.clone(),
            task_type: task_type.into(),
            step_number,
            status: TaskStatus::Queued,
            depends_on: None,
            geo_json: geo_json.into(),
            input: None,
            output: None,
            progress: None,
            result_id: None,
            created_at: Utc::now(),
        }
    }

    /// Parse-on-read of the serialized output. Falls back to the raw string
    /// when the payload is not valid JSON.
    pub fn output_value(&self) -> Option<Value> {
        self.output.as_ref().map(|raw| {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
        })
    }

    /// Extracts the error string of a failed task from its output envelope.
    ///
    /// Returns the `message` or `error` field when the output deserializes to
    /// an object carrying one; otherwise returns a generic error string
    /// together with the raw output to preserve.
    pub fn failure_details(&self) -> (String, Option<Value>) {
        match self.output_value() {
            Some(Value::Object(map)) => {
                match map.get("message").or_else(|| map.get("error")) {
                    Some(field) => {
                        let message = field
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| field.to_string());
                        (message, None)
                    }
                    None => ("Task failed".to_string(), Some(Value::Object(map))),
                }
            }
            Some(other) => ("Task failed".to_string(), Some(other)),
            None => ("Task failed".to_string(), None),
        }
    }
}

/// The result row produced when a task completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub result_id: String,
    pub task_id: String,
    /// Serialized job output.
    pub data: String,
    pub created_at: DateTime<Utc>,
}

impl TaskResult {
    pub fn new(task_id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            result_id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            data: data.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn queued_task() -> Task {
        let workflow = Workflow::new("client-1");
        Task::new(&workflow, "polygonArea", 1, "{}")
    }

    #[test]
    fn test_new_task_copies_workflow_identity() {
        let workflow = Workflow::new("client-1");
        let task = Task::new(&workflow, "analysis", 2, "{}");

        assert_eq!(task.client_id, "client-1");
        assert_eq!(task.workflow_id, workflow.workflow_id);
        assert_eq!(task.status, TaskStatus::Queued);
        assert!(task.depends_on.is_none());
        assert!(task.result_id.is_none());
    }

    #[test]
    fn test_status_serialization_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&WorkflowStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Queued).unwrap(),
            "\"queued\""
        );
        assert_eq!(WorkflowStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_output_value_parses_json() {
        let mut task = queued_task();
        task.output = Some(r#"{"area": 12.5, "unit": "square meters"}"#.to_string());

        let value = task.output_value().unwrap();
        assert_eq!(value["area"], json!(12.5));
    }

    #[test]
    fn test_output_value_falls_back_to_raw_string() {
        let mut task = queued_task();
        task.output = Some("not json at all".to_string());

        assert_eq!(
            task.output_value().unwrap(),
            Value::String("not json at all".to_string())
        );
    }

    #[test]
    fn test_failure_details_extracts_error_field() {
        let mut task = queued_task();
        task.output = Some(r#"{"error": "polygon is degenerate"}"#.to_string());

        let (message, preserved) = task.failure_details();
        assert_eq!(message, "polygon is degenerate");
        assert!(preserved.is_none());
    }

    #[test]
    fn test_failure_details_preserves_unstructured_output() {
        let mut task = queued_task();
        task.output = Some(r#"{"partial": 3}"#.to_string());

        let (message, preserved) = task.failure_details();
        assert_eq!(message, "Task failed");
        assert_eq!(preserved.unwrap(), json!({"partial": 3}));
    }

    #[test]
    fn test_failure_details_without_output() {
        let (message, preserved) = queued_task().failure_details();
        assert_eq!(message, "Task failed");
        assert!(preserved.is_none());
    }
}
