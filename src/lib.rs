//! petal: a small embeddable ETL engine.
//!
//! Callers open a pipeline, construct operators (they register into the open
//! pipeline) and compose them into a directed graph. Running the pipeline
//! checks the graph is acyclic, orders it topologically and executes every
//! node once, feeding each node the outputs of its upstream nodes.
//!
//! ```no_run
//! use petal::operators::{FileReader, FileWriter, RegexFilter};
//! use petal::{NodeRef, Pipeline};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut pipeline = Pipeline::new("copy_info_lines");
//!     {
//!         let _ctx = pipeline.open();
//!         let read = NodeRef::source("read_logs", FileReader::new("input.txt"))?;
//!         let keep = NodeRef::transform("filter_info", RegexFilter::new("^INFO")?)?;
//!         let write = NodeRef::sink("write_file", FileWriter::new("output.txt"))?;
//!         read.to(&keep)?.to(&write)?;
//!     }
//!     pipeline.run()?;
//!     Ok(())
//! }
//! ```

pub mod definition;
pub mod engine;
pub mod error;
pub mod graph;
pub mod operators;
pub mod pipeline;

pub use error::{EngineError, Result};
pub use graph::{
    Capability, Inputs, NodeKind, NodeRef, Output, Sink, Source, Transform, compose,
    compose_reverse,
};
pub use pipeline::Pipeline;
pub use serde_json::Value;
