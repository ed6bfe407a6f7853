//! Graph validation run before anything executes.
//!
//! - acyclicity (via the topological sort; a failed sort is a cycle)
//! - integrity: edges and upstream links only name registered nodes, and
//!   every upstream link was recorded as an edge

use crate::engine::schedule;
use crate::error::{EngineError, Result};
use crate::graph::{Edge, EdgeSet, NodeRef};
use std::collections::{BTreeMap, BTreeSet};

pub fn validate(edges: &EdgeSet) -> Result<()> {
    schedule::topological_order(edges).map(|_| ())
}

pub fn is_dag(edges: &EdgeSet) -> bool {
    validate(edges).is_ok()
}

pub(crate) fn check_integrity(nodes: &BTreeMap<String, NodeRef>, edges: &EdgeSet) -> Result<()> {
    for edge in edges {
        for id in [&edge.from, &edge.to] {
            if !nodes.contains_key(id) {
                return Err(EngineError::UnknownNode { id: id.clone() });
            }
        }
    }

    for (id, node) in nodes {
        for upstream in node.upstream_ids() {
            if !nodes.contains_key(&upstream) {
                return Err(EngineError::UnknownNode { id: upstream });
            }
            if !edges.contains(&Edge::new(upstream.as_str(), id.as_str())) {
                return Err(EngineError::UnrecordedEdge {
                    from: upstream,
                    to: id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Find one concrete cycle among `residual`, the nodes a topological sort
/// could not place. Falls back to listing the residual nodes.
pub(crate) fn find_cycle(residual: &BTreeSet<&str>, edges: &EdgeSet) -> Vec<String> {
    let mut children = BTreeMap::<&str, Vec<&str>>::new();
    for e in edges {
        if residual.contains(e.from.as_str()) && residual.contains(e.to.as_str()) {
            children.entry(e.from.as_str()).or_default().push(e.to.as_str());
        }
    }

    // DFS coloring with an explicit stack of (node, next child index).
    #[derive(Copy, Clone, PartialEq, Eq)]
    enum Mark {
        Temp,
        Perm,
    }

    let mut marks = BTreeMap::<&str, Mark>::new();
    let mut stack = Vec::<(&str, usize)>::new();
    for &root in residual {
        if marks.contains_key(root) {
            continue;
        }
        marks.insert(root, Mark::Temp);
        stack.push((root, 0));

        while let Some((v, next)) = stack.last_mut() {
            let v = *v;
            let child = children.get(v).and_then(|kids| kids.get(*next)).copied();
            *next += 1;

            let Some(k) = child else {
                marks.insert(v, Mark::Perm);
                stack.pop();
                continue;
            };
            match marks.get(k) {
                Some(Mark::Perm) => {}
                Some(Mark::Temp) => {
                    // k is on the current path => cycle
                    let start = stack.iter().position(|&(n, _)| n == k).unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|(n, _)| n.to_string()).collect();
                    path.push(k.to_string());
                    return path;
                }
                None => {
                    marks.insert(k, Mark::Temp);
                    stack.push((k, 0));
                }
            }
        }
    }
    residual.iter().map(|n| n.to_string()).collect()
}
