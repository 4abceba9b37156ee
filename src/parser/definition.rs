// ABOUTME: Declarative workflow definition documents and parsing
// ABOUTME: Defines the WorkflowDefinition and StepConfig structures loaded from YAML

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ParserError, Result};

/// A named workflow template: an ordered list of steps, each binding a task
/// type to a step number with an optional dependency on an earlier step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepConfig {
    pub task_type: String,
    pub step_number: u32,
    #[serde(default)]
    pub depends_on: Option<u32>,
}

impl WorkflowDefinition {
    /// Parse a definition from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a definition from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let definition: WorkflowDefinition = serde_yaml::from_str(content)?;
        definition.validate_structure()?;
        Ok(definition)
    }

    /// Validate basic document structure. Registry-dependent validation
    /// (task types, dependency wiring) belongs to the workflow factory.
    fn validate_structure(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ParserError::MissingField("name".to_string()));
        }
        if self.steps.is_empty() {
            return Err(ParserError::EmptyDefinition);
        }
        Ok(())
    }

    /// Look up a step by its step number.
    pub fn step(&self, step_number: u32) -> Option<&StepConfig> {
        self.steps.iter().find(|s| s.step_number == step_number)
    }
}
