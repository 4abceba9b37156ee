// ABOUTME: Named library of workflow definitions loaded from a directory
// ABOUTME: Maps file stems to parsed definitions for lookup at request time

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use super::definition::WorkflowDefinition;
use super::error::Result;

/// The workflow name clients get when they do not ask for one.
pub const DEFAULT_WORKFLOW_NAME: &str = "example_workflow";

/// All declarative workflow files known to the service, keyed by file stem.
#[derive(Debug, Default)]
pub struct DefinitionLibrary {
    definitions: HashMap<String, WorkflowDefinition>,
}

impl DefinitionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.yaml`/`.yml` file in the directory. A file that fails to
    /// parse fails the whole load; the service should not start with a
    /// half-usable library.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut library = Self::new();

        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if !path.is_file() || !is_yaml {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let definition = WorkflowDefinition::from_file(&path)?;
            debug!("Loaded workflow definition '{}' from {:?}", stem, path);
            library.insert(stem, definition);
        }

        info!(
            "Definition library loaded: {} workflow(s): {:?}",
            library.len(),
            library.names()
        );
        Ok(library)
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: WorkflowDefinition) {
        self.definitions.insert(name.into(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&WorkflowDefinition> {
        self.definitions.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
