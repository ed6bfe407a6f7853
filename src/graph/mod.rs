//! Graph layer: operator model, scoped graph context and composition.
//!
//! It owns:
//! - the node model (capabilities, `process` contract, lazy outputs)
//! - the context stack nodes and edges register into
//! - composition, the only way to create an edge

pub mod compose;
pub mod context;
pub mod node;

pub use compose::{compose, compose_reverse};
pub use context::{ContextGuard, Edge, EdgeSet, GraphContext};
pub use node::{
    Capability, Inputs, LazySeq, NodeKind, NodeRef, Output, Sink, Source, Transform, elements,
};
