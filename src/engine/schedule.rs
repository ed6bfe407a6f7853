//! Topological ordering (Kahn's algorithm).
//!
//! Ids enter the work queue in sorted order, so the result is stable for a
//! given graph. Callers should still only rely on edge precedence.

use crate::engine::validate;
use crate::error::{EngineError, Result};
use crate::graph::EdgeSet;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Order every node mentioned in `edges` so that `from` precedes `to` for
/// each edge.
pub fn topological_order(edges: &EdgeSet) -> Result<Vec<String>> {
    kahn(endpoints(edges), edges)
}

/// Like [`topological_order`], but also places `node_ids` that take part in
/// no edge.
pub fn execution_order<'a>(
    node_ids: impl IntoIterator<Item = &'a str>,
    edges: &'a EdgeSet,
) -> Result<Vec<String>> {
    let mut nodes: BTreeSet<&str> = node_ids.into_iter().collect();
    nodes.extend(endpoints(edges));
    kahn(nodes, edges)
}

fn endpoints(edges: &EdgeSet) -> BTreeSet<&str> {
    edges
        .iter()
        .flat_map(|e| [e.from.as_str(), e.to.as_str()])
        .collect()
}

fn kahn<'a>(nodes: BTreeSet<&'a str>, edges: &'a EdgeSet) -> Result<Vec<String>> {
    let mut successors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut in_degree: BTreeMap<&str, usize> = nodes.into_iter().map(|n| (n, 0)).collect();
    for edge in edges {
        successors
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
        *in_degree.entry(edge.to.as_str()).or_default() += 1;
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|&(_, degree)| *degree == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());
    while let Some(node) = queue.pop_front() {
        order.push(node.to_string());
        for &next in successors.get(node).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    if order.len() < in_degree.len() {
        // Whatever still has incoming edges sits on or behind a cycle.
        let residual: BTreeSet<&str> = in_degree
            .into_iter()
            .filter(|&(_, degree)| degree > 0)
            .map(|(id, _)| id)
            .collect();
        return Err(EngineError::cyclic(validate::find_cycle(&residual, edges)));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use pretty_assertions::assert_eq;

    fn edges(pairs: &[(&str, &str)]) -> EdgeSet {
        pairs.iter().map(|&(a, b)| Edge::new(a, b)).collect()
    }

    fn index(order: &[String], id: &str) -> usize {
        order.iter().position(|n| n == id).unwrap()
    }

    fn assert_respects(order: &[String], edges: &EdgeSet) {
        for e in edges {
            assert!(
                index(order, &e.from) < index(order, &e.to),
                "{} must precede {} in {:?}",
                e.from,
                e.to,
                order
            );
        }
    }

    #[test]
    fn linear_chain() {
        let e = edges(&[("A", "B"), ("B", "C")]);
        assert_eq!(topological_order(&e).unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn diamond() {
        let e = edges(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let order = topological_order(&e).unwrap();
        assert_eq!(order.len(), 4);
        assert_respects(&order, &e);
        assert_eq!(order.first().map(String::as_str), Some("A"));
        assert_eq!(order.last().map(String::as_str), Some("D"));
    }

    #[test]
    fn disconnected_components() {
        let e = edges(&[("A", "B"), ("X", "Y"), ("Y", "Z")]);
        let order = topological_order(&e).unwrap();
        assert_eq!(order.len(), 5);
        assert_respects(&order, &e);
    }

    #[test]
    fn independent_predecessors() {
        let e = edges(&[("A", "C"), ("B", "C")]);
        let order = topological_order(&e).unwrap();
        assert_respects(&order, &e);
    }

    #[test]
    fn result_is_a_permutation_of_mentioned_nodes() {
        let e = edges(&[("e", "a"), ("d", "a"), ("c", "b"), ("b", "a"), ("e", "c")]);
        let mut order = topological_order(&e).unwrap();
        assert_respects(&order, &e);
        order.sort();
        assert_eq!(order, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn cycle_is_rejected() {
        let e = edges(&[("A", "B"), ("B", "C"), ("C", "A")]);
        let err = topological_order(&e).unwrap_err();
        assert!(matches!(err, EngineError::CyclicGraph { .. }));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn self_loop_is_rejected() {
        let e = edges(&[("X", "X")]);
        match topological_order(&e) {
            Err(EngineError::CyclicGraph { path }) => assert_eq!(path, vec!["X", "X"]),
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn empty_graph() {
        assert!(topological_order(&EdgeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn execution_order_includes_isolated_nodes() {
        let e = edges(&[("A", "B")]);
        let order = execution_order(["A", "B", "lonely"], &e).unwrap();
        assert_eq!(order.len(), 3);
        assert!(order.contains(&"lonely".to_string()));
        assert_respects(&order, &e);
    }
}
