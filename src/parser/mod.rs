// ABOUTME: Workflow definition parsing module
// ABOUTME: Exports definition documents, the named library, and parser errors

pub mod definition;
pub mod error;
pub mod library;

pub use definition::{StepConfig, WorkflowDefinition};
pub use error::{ParserError, Result};
pub use library::{DefinitionLibrary, DEFAULT_WORKFLOW_NAME};
