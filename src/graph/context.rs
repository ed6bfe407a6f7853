//! Scoped graph-building context.
//!
//! Opening a context pushes it onto a thread-local stack; the returned guard
//! pops it again when dropped, including on early return or unwinding. While
//! a context is on top of the stack, newly constructed nodes register into it
//! and compositions record their edge in it, so graph-building code does not
//! have to thread a handle through every call. The guard also offers explicit
//! `add`/`compose` for callers that prefer passing the context around.

use crate::error::{EngineError, Result};
use crate::graph::compose;
use crate::graph::node::{NodeKind, NodeRef};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::rc::Rc;

thread_local! {
    static ACTIVE: RefCell<Vec<Rc<RefCell<GraphState>>>> = const { RefCell::new(Vec::new()) };
}

/// Directed edge `from -> to`, keyed by node id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

pub type EdgeSet = BTreeSet<Edge>;

#[derive(Debug, Default)]
pub(crate) struct GraphState {
    pub(crate) nodes: BTreeMap<String, NodeRef>,
    pub(crate) edges: EdgeSet,
}

impl GraphState {
    fn register_node(&mut self, node: &NodeRef) -> Result<()> {
        match self.nodes.get(node.id()) {
            Some(existing) if existing.ptr_eq(node) => Ok(()),
            Some(_) => Err(EngineError::DuplicateNodeId {
                id: node.id().to_string(),
            }),
            None => {
                self.nodes.insert(node.id().to_string(), node.clone());
                Ok(())
            }
        }
    }

    pub(crate) fn add_edge(&mut self, from: &str, to: &str) -> bool {
        self.edges.insert(Edge::new(from, to))
    }
}

/// Accumulates nodes and edges while open.
#[derive(Debug, Default)]
pub struct GraphContext {
    state: Rc<RefCell<GraphState>>,
}

impl GraphContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the graph and make this context the current one until the guard
    /// is dropped.
    ///
    /// Nodes from the previous graph lose their links, so a rebuilt graph
    /// only carries the compositions made since this call.
    pub fn open(&mut self) -> ContextGuard<'_> {
        let stale = std::mem::take(&mut *self.state.borrow_mut());
        for node in stale.nodes.values() {
            node.unlink();
        }
        ACTIVE.with(|stack| stack.borrow_mut().push(Rc::clone(&self.state)));
        ContextGuard {
            state: Rc::clone(&self.state),
            _context: PhantomData,
        }
    }

    pub fn is_active(&self) -> bool {
        ACTIVE.with(|stack| stack.borrow().iter().any(|c| Rc::ptr_eq(c, &self.state)))
    }

    pub fn node(&self, id: &str) -> Option<NodeRef> {
        self.state.borrow().nodes.get(id).cloned()
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.state.borrow().nodes.keys().cloned().collect()
    }

    pub fn edges(&self) -> EdgeSet {
        self.state.borrow().edges.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn state(&self) -> Ref<'_, GraphState> {
        self.state.borrow()
    }
}

/// Keeps a context current. Dropping it closes the context.
pub struct ContextGuard<'g> {
    state: Rc<RefCell<GraphState>>,
    _context: PhantomData<&'g mut GraphContext>,
}

impl ContextGuard<'_> {
    /// Construct a node and register it in this context only.
    pub fn add(&self, id: impl Into<String>, kind: NodeKind) -> Result<NodeRef> {
        let node = NodeRef::detached(id, kind);
        self.register(&node)?;
        Ok(node)
    }

    pub fn register(&self, node: &NodeRef) -> Result<()> {
        self.state.borrow_mut().register_node(node)
    }

    /// Compose `source -> destination`, recording the edge in this context.
    pub fn compose(&self, source: &NodeRef, destination: &NodeRef) -> Result<NodeRef> {
        compose::compose_in(Some(self.state.as_ref()), source, destination)
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        ACTIVE.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|c| Rc::ptr_eq(c, &self.state)) {
                stack.remove(pos);
            }
        });
    }
}

/// The context on top of the stack, if any.
pub(crate) fn current() -> Option<Rc<RefCell<GraphState>>> {
    ACTIVE.with(|stack| stack.borrow().last().cloned())
}

/// Number of contexts currently open on this thread.
pub fn depth() -> usize {
    ACTIVE.with(|stack| stack.borrow().len())
}

pub(crate) fn register_current(node: &NodeRef) -> Result<()> {
    match current() {
        Some(state) => state.borrow_mut().register_node(node),
        None => Ok(()),
    }
}
