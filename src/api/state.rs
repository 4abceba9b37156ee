// ABOUTME: Shared state for the workflow API router
// ABOUTME: Bundles the store, factory, and definition library handed to handlers

use std::sync::Arc;

use crate::engine::WorkflowFactory;
use crate::parser::DefinitionLibrary;
use crate::store::Store;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn Store>,
    pub factory: Arc<WorkflowFactory>,
    pub library: Arc<DefinitionLibrary>,
}

impl ApiState {
    pub fn new(
        store: Arc<dyn Store>,
        factory: Arc<WorkflowFactory>,
        library: Arc<DefinitionLibrary>,
    ) -> Self {
        Self {
            store,
            factory,
            library,
        }
    }
}
