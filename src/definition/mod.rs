//! Definition layer: JSON pipeline files + building them into a `Pipeline`.
//!
//! This module is intentionally separate from the engine. It owns:
//! - the serde shapes of a pipeline file
//! - validation and construction of the operator graph it describes

pub mod build;
pub mod raw;

pub use raw::{NodeDefinition, OperatorDefinition, PipelineDefinition};
