// ABOUTME: Main library module for the geoflow workflow service
// ABOUTME: Exports all core modules and provides the public API

pub mod api;
pub mod cli;
pub mod engine;
pub mod jobs;
pub mod parser;
pub mod store;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use engine::{Dispatcher, EngineError, TaskRunner, WorkflowFactory, WorkflowReconciler};
pub use jobs::{Job, JobContext, JobError, JobRegistry};
pub use parser::{DefinitionLibrary, StepConfig, WorkflowDefinition};
pub use store::{MemoryStore, Store, Task, TaskResult, TaskStatus, Workflow, WorkflowStatus};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
