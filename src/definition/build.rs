//! Turn a parsed definition into a runnable `Pipeline`.

use crate::definition::raw::{OperatorDefinition, PipelineDefinition};
use crate::graph::NodeKind;
use crate::operators::{
    EmptySource, FileReader, FileWriter, Identity, Joiner, LogWriter, NoOpSink, RegexFilter,
    RegexMapper, Splitter, Values,
};
use crate::pipeline::Pipeline;
use anyhow::{Context, bail};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

impl PipelineDefinition {
    /// Validate the definition and build its graph:
    /// - at least one node, unique node ids
    /// - edges reference declared nodes
    /// - operators can be constructed (e.g. regex patterns compile)
    ///
    /// Relative file paths are resolved against `base_dir`. Cycles are left
    /// for the engine to reject when the pipeline is validated or run.
    pub fn build(&self, base_dir: &Path) -> anyhow::Result<Pipeline> {
        if self.nodes.is_empty() {
            bail!("pipeline definition '{}' contains no nodes", self.name);
        }

        let mut pipeline = Pipeline::new(&self.name);
        {
            let scope = pipeline.open();

            let mut nodes = BTreeMap::new();
            for node in &self.nodes {
                if nodes.contains_key(node.id.as_str()) {
                    bail!("duplicate node id in pipeline definition: {}", node.id);
                }
                let kind = node
                    .operator
                    .instantiate(base_dir)
                    .with_context(|| format!("build operator '{}'", node.id))?;
                nodes.insert(node.id.as_str(), scope.add(&node.id, kind)?);
            }

            for [src, dst] in &self.edges {
                let Some(source) = nodes.get(src.as_str()) else {
                    bail!("edge references unknown src node: {}", src);
                };
                let Some(destination) = nodes.get(dst.as_str()) else {
                    bail!("edge references unknown dst node: {}", dst);
                };
                scope.compose(source, destination)?;
            }
        }

        debug!(
            pipeline = %self.name,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "built pipeline from definition"
        );
        Ok(pipeline)
    }
}

impl OperatorDefinition {
    pub fn instantiate(&self, base_dir: &Path) -> anyhow::Result<NodeKind> {
        let kind = match self {
            Self::EmptySource => NodeKind::source(EmptySource),
            Self::Values { items, lazy: false } => NodeKind::source(Values::new(items.clone())),
            Self::Values { items, lazy: true } => NodeKind::source(Values::lazy(items.clone())),
            Self::FileReader { path } => NodeKind::source(FileReader::new(base_dir.join(path))),
            Self::Identity => NodeKind::transform(Identity),
            Self::Splitter => NodeKind::transform(Splitter),
            Self::RegexFilter { pattern } => NodeKind::transform(RegexFilter::new(pattern)?),
            Self::RegexMapper { pattern } => NodeKind::transform(RegexMapper::new(pattern)?),
            Self::StreamJoiner => NodeKind::transform(Joiner::concatenate()),
            Self::FileWriter { path } => NodeKind::sink(FileWriter::new(base_dir.join(path))),
            Self::NoopSink => NodeKind::sink(NoOpSink),
            Self::LogWriter { batch_size } => NodeKind::sink(LogWriter::new(*batch_size)),
        };
        Ok(kind)
    }
}
