// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides a seeded engine harness, job stubs, and GeoJSON fixtures

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use geoflow::engine::{Dispatcher, TaskRunner, WorkflowFactory};
use geoflow::jobs::{Job, JobContext, JobError, JobRegistry};
use geoflow::parser::{DefinitionLibrary, StepConfig, WorkflowDefinition};
use geoflow::store::{MemoryStore, Store, Task, Workflow};

/// A job that fails deterministically, recording a structured envelope the
/// way real jobs do.
pub struct FailingJob;

#[async_trait]
impl Job for FailingJob {
    fn task_type(&self) -> &'static str {
        "alwaysFails"
    }

    async fn run(&self, task: &mut Task, _ctx: &JobContext) -> geoflow::jobs::Result<Value> {
        task.output = Some(json!({ "error": "synthetic failure" }).to_string());
        Err(JobError::Failed("synthetic failure".to_string()))
    }
}

/// Fully wired engine over an in-memory store, with the failing job
/// registered alongside the builtins.
pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub factory: Arc<WorkflowFactory>,
    pub dispatcher: Arc<Dispatcher>,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let store_dyn: Arc<dyn Store> = store.clone();

        let mut registry = JobRegistry::new();
        registry.register(Box::new(FailingJob));
        let registry = Arc::new(registry);

        let factory = Arc::new(WorkflowFactory::new(store_dyn.clone(), registry.clone()));
        let runner = Arc::new(TaskRunner::new(store_dyn.clone(), registry));
        let dispatcher = Arc::new(Dispatcher::new(
            store_dyn,
            runner,
            Duration::from_millis(10),
        ));

        Self {
            store,
            factory,
            dispatcher,
        }
    }

    /// Drive dispatch iterations until the workflow reaches a terminal
    /// status. Panics if it never does.
    pub async fn drive_to_terminal(&self, workflow_id: &str) -> Workflow {
        for _ in 0..50 {
            self.dispatcher.tick().await.expect("dispatcher tick");
            let workflow = self
                .store
                .get_workflow(workflow_id)
                .await
                .unwrap()
                .expect("workflow exists");
            if workflow.status.is_terminal() {
                return workflow;
            }
        }
        panic!("workflow {} did not reach a terminal state", workflow_id);
    }
}

pub fn definition(name: &str, steps: Vec<StepConfig>) -> WorkflowDefinition {
    WorkflowDefinition {
        name: name.to_string(),
        steps,
    }
}

pub fn step(task_type: &str, step_number: u32, depends_on: Option<u32>) -> StepConfig {
    StepConfig {
        task_type: task_type.to_string(),
        step_number,
        depends_on,
    }
}

/// The definition library the API tests serve from: the shipped workflow
/// files plus one definition that cannot validate.
pub fn library_with_examples() -> DefinitionLibrary {
    let mut library = DefinitionLibrary::new();
    library.insert(
        "example_workflow",
        WorkflowDefinition::from_file("workflows/example_workflow.yaml").unwrap(),
    );
    library.insert(
        "polygon_test_workflow",
        WorkflowDefinition::from_file("workflows/polygon_test_workflow.yaml").unwrap(),
    );
    library.insert(
        "bad_workflow",
        definition("bad_workflow", vec![step("invalidTaskType", 1, None)]),
    );
    library
}

/// A valid polygon Feature: one square degree at the equator.
pub fn unit_square_feature() -> Value {
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        }
    })
}

/// A polygon whose centroid lands inside Brazil's bounding extent.
pub fn brazil_square_feature() -> Value {
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [-51.0, -11.0], [-49.0, -11.0], [-49.0, -9.0], [-51.0, -9.0], [-51.0, -11.0]
            ]]
        }
    })
}
