//! Pipeline definition files.
//!
//! JSON shape:
//! {
//!   "name": "copy_file_to_file",
//!   "nodes": [
//!     { "id": "read_logs",   "kind": "file_reader",  "path": "input.txt" },
//!     { "id": "filter_info", "kind": "regex_filter", "pattern": "^INFO" },
//!     { "id": "write_file",  "kind": "file_writer",  "path": "output.txt" }
//!   ],
//!   "edges": [["read_logs", "filter_info"], ["filter_info", "write_file"]]
//! }
//!
//! Edges are composed in the order they are listed, which fixes the input
//! order of fan-in nodes.

use crate::operators::sink::DEFAULT_BATCH_SIZE;
use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDefinition {
    pub name: String,

    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,

    /// Directed edges: [src, dst]
    #[serde(default)]
    pub edges: Vec<[String; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDefinition {
    pub id: String,

    #[serde(flatten)]
    pub operator: OperatorDefinition,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorDefinition {
    EmptySource,
    Values {
        items: Vec<Value>,
        #[serde(default)]
        lazy: bool,
    },
    FileReader {
        path: PathBuf,
    },
    Identity,
    Splitter,
    RegexFilter {
        pattern: String,
    },
    RegexMapper {
        pattern: String,
    },
    StreamJoiner,
    FileWriter {
        path: PathBuf,
    },
    NoopSink,
    LogWriter {
        #[serde(default = "default_batch_size")]
        batch_size: usize,
    },
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl PipelineDefinition {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read pipeline definition {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parse pipeline definition {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
