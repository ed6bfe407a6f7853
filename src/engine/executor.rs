//! Sequential pipeline execution.
//!
//! Every node runs exactly once, in topological order. A node's inputs are
//! read from the memo of already computed outputs, in upstream declaration
//! order. Lazy outputs are drained before they are stored so that any number
//! of downstream nodes can read them.

use crate::engine::{schedule, validate};
use crate::error::{EngineError, Result};
use crate::graph::{Inputs, NodeRef};
use crate::pipeline::Pipeline;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Validate the pipeline graph and compute the order its nodes run in.
pub fn plan(pipeline: &Pipeline) -> Result<Vec<String>> {
    let graph = pipeline.context().state();
    validate::validate(&graph.edges)?;
    validate::check_integrity(&graph.nodes, &graph.edges)?;
    schedule::execution_order(graph.nodes.keys().map(String::as_str), &graph.edges)
}

pub fn run(pipeline: &Pipeline) -> Result<()> {
    let order = plan(pipeline)?;
    let graph = pipeline.context().state();

    info!(
        pipeline = pipeline.name(),
        nodes = order.len(),
        edges = graph.edges.len(),
        "executing pipeline"
    );
    debug!(?order, "execution order");

    let mut memo: HashMap<&str, Value> = HashMap::with_capacity(order.len());
    for id in &order {
        let node = lookup(&graph.nodes, id)?;
        let value = execute(node, &memo)?;
        memo.insert(node.id(), value);
    }

    info!(pipeline = pipeline.name(), "pipeline finished");
    Ok(())
}

fn lookup<'g>(nodes: &'g BTreeMap<String, NodeRef>, id: &str) -> Result<&'g NodeRef> {
    nodes
        .get(id)
        .ok_or_else(|| EngineError::UnknownNode { id: id.to_string() })
}

fn execute(node: &NodeRef, memo: &HashMap<&str, Value>) -> Result<Value> {
    let inputs = node
        .upstream_ids()
        .into_iter()
        .map(|up| memo.get(up.as_str()).ok_or(EngineError::UnknownNode { id: up }))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        operator = node.id(),
        capability = %node.capability(),
        inputs = inputs.len(),
        "executing operator"
    );

    let failed = |source| EngineError::OperatorExecution {
        id: node.id().to_string(),
        source,
    };
    let output = node.process(Inputs::new(inputs)).map_err(failed)?;
    let lazy = output.is_lazy();
    let value = output.materialize().map_err(failed)?;
    if lazy {
        debug!(
            operator = node.id(),
            items = value.as_array().map_or(0, Vec::len),
            "materialized lazy output"
        );
    }
    Ok(value)
}
