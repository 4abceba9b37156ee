// ABOUTME: Job implementations for the task types the service executes
// ABOUTME: Defines the Job contract, execution context, and task-type registry

pub mod analysis;
pub mod error;
pub mod notification;
pub mod polygon_area;
pub mod report;

pub use error::{JobError, Result};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::store::{Store, Task};

/// Shared services a job may reach for. Most jobs only read the task they
/// are handed; the report generator also queries and writes through the
/// store.
#[derive(Clone)]
pub struct JobContext {
    pub store: Arc<dyn Store>,
}

impl JobContext {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

/// A unit of executable work bound to a task type.
///
/// `run` produces a serializable value or fails with a `JobError`. Jobs are
/// expected to record their serialized result into `task.output` before
/// returning, and a `{"error": ...}` envelope before failing; the runner
/// persists whatever the job left there.
#[async_trait]
pub trait Job: Send + Sync {
    fn task_type(&self) -> &'static str;

    async fn run(&self, task: &mut Task, ctx: &JobContext) -> Result<Value>;
}

/// Records a structured error envelope in the task's output side channel.
pub(crate) fn record_error_envelope(task: &mut Task, message: &str) {
    let envelope = serde_json::json!({ "error": message });
    task.output = Some(envelope.to_string());
}

/// Maps task-type tags to job implementations. Populated at process start;
/// lookups after that never mutate it.
pub struct JobRegistry {
    jobs: HashMap<String, Box<dyn Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            jobs: HashMap::new(),
        };

        // Register all built-in job implementations
        registry.register(Box::new(polygon_area::PolygonAreaJob));
        registry.register(Box::new(analysis::CountryAnalysisJob));
        registry.register(Box::new(notification::NotificationJob));
        registry.register(Box::new(report::ReportGenerationJob));

        registry
    }

    pub fn register(&mut self, job: Box<dyn Job>) {
        let task_type = job.task_type().to_string();
        self.jobs.insert(task_type, job);
    }

    pub fn get(&self, task_type: &str) -> Option<&dyn Job> {
        self.jobs.get(task_type).map(|job| job.as_ref())
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.jobs.contains_key(task_type)
    }

    pub fn supported_types(&self) -> Vec<&str> {
        self.jobs.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
