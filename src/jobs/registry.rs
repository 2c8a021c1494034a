use crate::entities::JobKind;
use crate::jobs::{JobError, JobHandler};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of job handlers by kind
#[derive(Default, Clone)]
pub struct JobRegistry {
    handlers: HashMap<JobKind, Arc<dyn JobHandler>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a job handler for a specific kind. A later registration for
    /// the same kind replaces the earlier one.
    pub fn register<H: JobHandler>(&mut self, handler: H) {
        self.handlers.insert(handler.kind(), Arc::new(handler));
    }

    /// Look up the handler for the given job kind
    pub fn handler(&self, kind: JobKind) -> Result<Arc<dyn JobHandler>, JobError> {
        self.handlers
            .get(&kind)
            .cloned()
            .ok_or(JobError::NoHandler(kind))
    }

    /// Get all registered job kinds
    pub fn registered_kinds(&self) -> Vec<JobKind> {
        self.handlers.keys().copied().collect()
    }
}
