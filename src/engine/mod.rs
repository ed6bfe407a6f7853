//! Engine layer: validation, scheduling and execution of a built graph.

pub mod executor;
pub mod schedule;
pub mod validate;

pub use executor::{plan, run};
pub use schedule::{execution_order, topological_order};
pub use validate::{is_dag, validate};
