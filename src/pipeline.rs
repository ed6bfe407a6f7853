//! Named graph context that can be run.

use crate::engine::{self, executor};
use crate::error::Result;
use crate::graph::{ContextGuard, EdgeSet, GraphContext, NodeRef};
use tracing::debug;

#[derive(Debug, Default)]
pub struct Pipeline {
    name: String,
    context: GraphContext,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: GraphContext::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start building the pipeline graph. Nodes constructed and compositions
    /// made while the guard is alive land in this pipeline.
    pub fn open(&mut self) -> ContextGuard<'_> {
        debug!(pipeline = %self.name, "opening pipeline context");
        self.context.open()
    }

    pub fn context(&self) -> &GraphContext {
        &self.context
    }

    pub fn node(&self, id: &str) -> Option<NodeRef> {
        self.context.node(id)
    }

    pub fn edges(&self) -> EdgeSet {
        self.context.edges()
    }

    pub fn validate(&self) -> Result<()> {
        engine::validate(&self.context.state().edges)
    }

    pub fn execution_order(&self) -> Result<Vec<String>> {
        executor::plan(self)
    }

    pub fn run(&self) -> Result<()> {
        executor::run(self)
    }
}
