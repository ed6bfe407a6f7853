//! Operator model: capabilities, the `process` contract and node handles.
//!
//! A node is one of three kinds:
//! - Source: no inputs, produces output
//! - Sink: consumes input, produces nothing further downstream
//! - NonTerminal: consumes input and produces output
//!
//! Behaviour lives behind the `Source`, `Sink` and `Transform` traits; the
//! engine only ever sees `NodeKind`.

use crate::error::Result;
use crate::graph::context;
use anyhow::bail;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Source,
    Sink,
    NonTerminal,
}

impl Capability {
    /// Output can be composed into a downstream node.
    pub fn produces(self) -> bool {
        matches!(self, Self::Source | Self::NonTerminal)
    }

    /// Accepts input from an upstream node.
    pub fn consumes(self) -> bool {
        matches!(self, Self::Sink | Self::NonTerminal)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Source => "source",
            Self::Sink => "sink",
            Self::NonTerminal => "non-terminal",
        };
        f.write_str(name)
    }
}

pub trait Source {
    fn produce(&self) -> anyhow::Result<Output<'_>>;
}

pub trait Sink {
    fn consume(&self, inputs: Inputs<'_>) -> anyhow::Result<()>;
}

pub trait Transform {
    fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>>;
}

pub enum NodeKind {
    Source(Box<dyn Source>),
    Sink(Box<dyn Sink>),
    NonTerminal(Box<dyn Transform>),
}

impl NodeKind {
    pub fn source(op: impl Source + 'static) -> Self {
        Self::Source(Box::new(op))
    }

    pub fn sink(op: impl Sink + 'static) -> Self {
        Self::Sink(Box::new(op))
    }

    pub fn transform(op: impl Transform + 'static) -> Self {
        Self::NonTerminal(Box::new(op))
    }

    pub fn capability(&self) -> Capability {
        match self {
            Self::Source(_) => Capability::Source,
            Self::Sink(_) => Capability::Sink,
            Self::NonTerminal(_) => Capability::NonTerminal,
        }
    }

    /// Uniform execution entry point. Sinks yield `Output::none()`.
    pub fn process<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        match self {
            Self::Source(op) => {
                if !inputs.is_empty() {
                    bail!("source operator received {} input(s)", inputs.len());
                }
                op.produce()
            }
            Self::Sink(op) => {
                op.consume(inputs)?;
                Ok(Output::none())
            }
            Self::NonTerminal(op) => op.transform(inputs),
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKind::{:?}", self.capability())
    }
}

/// Positional inputs of one node, in upstream declaration order.
#[derive(Debug, Clone, Default)]
pub struct Inputs<'a> {
    values: Vec<&'a Value>,
}

impl<'a> Inputs<'a> {
    pub fn new(values: Vec<&'a Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + '_ {
        self.values.iter().copied()
    }

    /// The only input, for operators that accept exactly one upstream.
    pub fn single(&self) -> anyhow::Result<&'a Value> {
        match self.values.as_slice() {
            [value] => Ok(*value),
            other => bail!("expected exactly one input, got {}", other.len()),
        }
    }
}

impl<'a> From<Vec<&'a Value>> for Inputs<'a> {
    fn from(values: Vec<&'a Value>) -> Self {
        Self::new(values)
    }
}

/// View a value as a sequence: arrays yield their items, `null` yields
/// nothing, any other value is a sequence of one.
pub fn elements(value: &Value) -> std::slice::Iter<'_, Value> {
    match value {
        Value::Array(items) => items.iter(),
        Value::Null => std::slice::Iter::default(),
        other => std::slice::from_ref(other).iter(),
    }
}

/// Result of a `process` call.
#[derive(Debug)]
pub enum Output<'a> {
    Value(Value),
    Lazy(LazySeq<'a>),
}

impl<'a> Output<'a> {
    pub fn none() -> Self {
        Self::Value(Value::Null)
    }

    pub fn lazy<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'a,
    {
        Self::Lazy(LazySeq::new(items))
    }

    pub fn lazy_fallible<I>(items: I) -> Self
    where
        I: IntoIterator<Item = anyhow::Result<Value>>,
        I::IntoIter: 'a,
    {
        Self::Lazy(LazySeq::fallible(items))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }

    /// Turn the output into a value that can be read any number of times.
    /// Lazy sequences are drained into a `Value::Array`.
    pub fn materialize(self) -> anyhow::Result<Value> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Lazy(seq) => seq.drain(),
        }
    }
}

impl From<Value> for Output<'_> {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Finite, single-pass sequence of values. Items may fail individually.
pub struct LazySeq<'a> {
    items: Box<dyn Iterator<Item = anyhow::Result<Value>> + 'a>,
}

impl<'a> LazySeq<'a> {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'a,
    {
        Self::fallible(items.into_iter().map(Ok::<Value, anyhow::Error>))
    }

    pub fn fallible<I>(items: I) -> Self
    where
        I: IntoIterator<Item = anyhow::Result<Value>>,
        I::IntoIter: 'a,
    {
        Self {
            items: Box::new(items.into_iter()),
        }
    }

    /// Collect every item; the first failing item aborts the drain.
    pub fn drain(self) -> anyhow::Result<Value> {
        self.collect::<anyhow::Result<Vec<_>>>().map(Value::Array)
    }
}

impl Iterator for LazySeq<'_> {
    type Item = anyhow::Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

impl fmt::Debug for LazySeq<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazySeq { .. }")
    }
}

pub struct Node {
    id: String,
    kind: NodeKind,
    links: RefCell<Links>,
}

#[derive(Default)]
struct Links {
    upstream: Vec<Link>,
    downstream: Vec<Link>,
}

/// Back-reference to a neighbour. Ownership stays with the graph.
struct Link {
    id: String,
    node: Weak<Node>,
}

/// Shared handle to a node.
#[derive(Clone)]
pub struct NodeRef(Rc<Node>);

impl NodeRef {
    /// Construct a node and register it with the active graph context, if any.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Result<Self> {
        let node = Self::detached(id, kind);
        context::register_current(&node)?;
        Ok(node)
    }

    /// Construct a node without touching any graph context.
    pub fn detached(id: impl Into<String>, kind: NodeKind) -> Self {
        Self(Rc::new(Node {
            id: id.into(),
            kind,
            links: RefCell::default(),
        }))
    }

    pub fn source(id: impl Into<String>, op: impl Source + 'static) -> Result<Self> {
        Self::new(id, NodeKind::source(op))
    }

    pub fn sink(id: impl Into<String>, op: impl Sink + 'static) -> Result<Self> {
        Self::new(id, NodeKind::sink(op))
    }

    pub fn transform(id: impl Into<String>, op: impl Transform + 'static) -> Result<Self> {
        Self::new(id, NodeKind::transform(op))
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn capability(&self) -> Capability {
        self.0.kind.capability()
    }

    /// Upstream ids in declaration order.
    pub fn upstream_ids(&self) -> Vec<String> {
        self.0.links.borrow().upstream.iter().map(|l| l.id.clone()).collect()
    }

    /// Downstream ids in declaration order.
    pub fn downstream_ids(&self) -> Vec<String> {
        self.0.links.borrow().downstream.iter().map(|l| l.id.clone()).collect()
    }

    /// Upstream nodes that are still alive.
    pub fn upstream(&self) -> Vec<NodeRef> {
        live(&self.0.links.borrow().upstream)
    }

    /// Downstream nodes that are still alive.
    pub fn downstream(&self) -> Vec<NodeRef> {
        live(&self.0.links.borrow().downstream)
    }

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Link `self -> destination`. Returns false if the link already existed.
    pub(crate) fn link_to(&self, destination: &NodeRef) -> bool {
        {
            let mut links = self.0.links.borrow_mut();
            let target = Rc::as_ptr(&destination.0);
            if links.downstream.iter().any(|l| l.node.as_ptr() == target) {
                return false;
            }
            links.downstream.push(Link {
                id: destination.0.id.clone(),
                node: Rc::downgrade(&destination.0),
            });
        }
        // Separate borrow: source and destination may be the same node.
        destination.0.links.borrow_mut().upstream.push(Link {
            id: self.0.id.clone(),
            node: Rc::downgrade(&self.0),
        });
        true
    }

    /// Forget every upstream and downstream link.
    pub(crate) fn unlink(&self) {
        let mut links = self.0.links.borrow_mut();
        links.upstream.clear();
        links.downstream.clear();
    }

    pub fn process<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        self.0.kind.process(inputs)
    }
}

fn live(links: &[Link]) -> Vec<NodeRef> {
    links
        .iter()
        .filter_map(|l| l.node.upgrade())
        .map(NodeRef)
        .collect()
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.0.id)
            .field("capability", &self.capability())
            .finish()
    }
}
