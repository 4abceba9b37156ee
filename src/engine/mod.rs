// ABOUTME: Task scheduling and execution engine module
// ABOUTME: Exports the factory, runner, dispatcher, and reconciler

pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod reconciler;
pub mod runner;

pub use dispatcher::Dispatcher;
pub use error::{EngineError, Result};
pub use factory::WorkflowFactory;
pub use reconciler::WorkflowReconciler;
pub use runner::TaskRunner;
