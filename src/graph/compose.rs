//! Composition: wiring one node's output into another node's input.

use crate::error::{EngineError, Result};
use crate::graph::context::{self, GraphState};
use crate::graph::node::NodeRef;
use std::cell::RefCell;

/// Wire `source -> destination` and record the edge in the active context.
///
/// Returns `destination` so calls chain left to right. Composing the same
/// pair twice has no further effect.
pub fn compose(source: &NodeRef, destination: &NodeRef) -> Result<NodeRef> {
    let active = context::current();
    compose_in(active.as_deref(), source, destination)
}

/// Mirror of [`compose`] for right-to-left authoring: wires
/// `source -> destination` and returns `source`.
pub fn compose_reverse(destination: &NodeRef, source: &NodeRef) -> Result<NodeRef> {
    compose(source, destination)?;
    Ok(source.clone())
}

pub(crate) fn compose_in(
    graph: Option<&RefCell<GraphState>>,
    source: &NodeRef,
    destination: &NodeRef,
) -> Result<NodeRef> {
    if !source.capability().produces() {
        return Err(EngineError::CompositionCapability {
            from: source.id().to_string(),
            to: destination.id().to_string(),
            reason: "source side is a sink and produces no output",
        });
    }
    if !destination.capability().consumes() {
        return Err(EngineError::CompositionCapability {
            from: source.id().to_string(),
            to: destination.id().to_string(),
            reason: "destination side is a source and accepts no input",
        });
    }

    source.link_to(destination);
    if let Some(graph) = graph {
        graph.borrow_mut().add_edge(source.id(), destination.id());
    }
    Ok(destination.clone())
}

impl NodeRef {
    /// Fluent form of [`compose`]: `a.to(&b)?.to(&c)?`.
    pub fn to(&self, destination: &NodeRef) -> Result<NodeRef> {
        compose(self, destination)
    }

    /// Fluent form of [`compose_reverse`]: `c.fed_by(&b)?.fed_by(&a)?`.
    pub fn fed_by(&self, source: &NodeRef) -> Result<NodeRef> {
        compose_reverse(self, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::context::{Edge, GraphContext};
    use crate::graph::node::{Inputs, Output, Sink, Source, Transform};
    use pretty_assertions::assert_eq;

    struct Src;
    struct Pass;
    struct Drain;

    impl Source for Src {
        fn produce(&self) -> anyhow::Result<Output<'_>> {
            Ok(Output::none())
        }
    }

    impl Transform for Pass {
        fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
            Ok(Output::Value(inputs.single()?.clone()))
        }
    }

    impl Sink for Drain {
        fn consume(&self, _inputs: Inputs<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn chaining_records_edges_and_links() {
        let mut ctx = GraphContext::new();
        {
            let _guard = ctx.open();
            let a = NodeRef::source("a", Src).unwrap();
            let b = NodeRef::transform("b", Pass).unwrap();
            let c = NodeRef::sink("c", Drain).unwrap();
            let last = a.to(&b).unwrap().to(&c).unwrap();
            assert!(last.ptr_eq(&c));
            assert_eq!(a.downstream_ids(), vec!["b".to_string()]);
            assert_eq!(c.upstream_ids(), vec!["b".to_string()]);
        }
        let expected: Vec<Edge> = vec![Edge::new("a", "b"), Edge::new("b", "c")];
        assert_eq!(ctx.edges().into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn reverse_composition_returns_the_source() {
        let mut ctx = GraphContext::new();
        {
            let _guard = ctx.open();
            let a = NodeRef::source("a", Src).unwrap();
            let b = NodeRef::transform("b", Pass).unwrap();
            let c = NodeRef::sink("c", Drain).unwrap();
            let first = c.fed_by(&b).unwrap().fed_by(&a).unwrap();
            assert!(first.ptr_eq(&a));
        }
        assert!(ctx.edges().contains(&Edge::new("a", "b")));
        assert!(ctx.edges().contains(&Edge::new("b", "c")));
    }

    #[test]
    fn composing_twice_yields_one_edge() {
        let mut ctx = GraphContext::new();
        {
            let _guard = ctx.open();
            let a = NodeRef::source("a", Src).unwrap();
            let c = NodeRef::sink("c", Drain).unwrap();
            compose(&a, &c).unwrap();
            compose(&a, &c).unwrap();
            assert_eq!(c.upstream_ids(), vec!["a".to_string()]);
        }
        assert_eq!(ctx.edges().len(), 1);
    }

    #[test]
    fn incompatible_capabilities_record_nothing() {
        let mut ctx = GraphContext::new();
        {
            let _guard = ctx.open();
            let a = NodeRef::source("a", Src).unwrap();
            let b = NodeRef::source("b", Src).unwrap();
            let s1 = NodeRef::sink("s1", Drain).unwrap();
            let s2 = NodeRef::sink("s2", Drain).unwrap();

            let err = compose(&s1, &s2).unwrap_err();
            assert!(matches!(err, EngineError::CompositionCapability { .. }));
            let err = compose(&a, &b).unwrap_err();
            assert!(matches!(err, EngineError::CompositionCapability { .. }));
            assert!(a.downstream_ids().is_empty());
            assert!(s1.downstream_ids().is_empty());
        }
        assert!(ctx.edges().is_empty());
    }

    #[test]
    fn composition_without_context_only_links() {
        let a = NodeRef::source("a", Src).unwrap();
        let c = NodeRef::sink("c", Drain).unwrap();
        a.to(&c).unwrap();
        assert_eq!(a.downstream_ids(), vec!["c".to_string()]);
    }

    #[test]
    fn self_loop_is_recorded_for_validation() {
        let mut ctx = GraphContext::new();
        {
            let _guard = ctx.open();
            let b = NodeRef::transform("b", Pass).unwrap();
            b.to(&b).unwrap();
        }
        assert!(ctx.edges().contains(&Edge::new("b", "b")));
    }
}
