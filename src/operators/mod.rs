//! Operator library.
//!
//! Plain operators over already resolved data. None of them know about the
//! graph; they only implement `Source`, `Sink` or `Transform`.

pub mod file;
pub mod joiner;
pub mod pattern;
pub mod sink;
pub mod source;
pub mod transform;

pub use file::{FileReader, FileWriter};
pub use joiner::{Joiner, concatenate};
pub use pattern::{RegexFilter, RegexMapper};
pub use sink::{Collected, Collector, LogWriter, NoOpSink};
pub use source::{EmptySource, Values};
pub use transform::{Filter, Identity, Mapper, Splitter};
