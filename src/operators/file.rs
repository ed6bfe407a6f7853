//! Line-oriented file reader and writer.

use crate::graph::{Inputs, Output, Sink, Source, elements};
use anyhow::Context;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Lazily yields each line of a file (without the line terminator).
#[derive(Debug, Clone)]
pub struct FileReader {
    path: PathBuf,
}

impl FileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileReader {
    fn produce(&self) -> anyhow::Result<Output<'_>> {
        info!(path = %self.path.display(), "reading file");
        let file = File::open(&self.path)
            .with_context(|| format!("open input file {}", self.path.display()))?;
        let path = &self.path;
        let lines = BufReader::new(file).lines().map(move |line| {
            line.map(Value::String)
                .with_context(|| format!("read line from {}", path.display()))
        });
        Ok(Output::lazy_fallible(lines))
    }
}

/// Writes each item of its input as one line. Strings are written verbatim,
/// other values as JSON.
#[derive(Debug, Clone)]
pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileWriter {
    fn consume(&self, inputs: Inputs<'_>) -> anyhow::Result<()> {
        let data = inputs.single()?;
        info!(path = %self.path.display(), "writing file");
        let file = File::create(&self.path)
            .with_context(|| format!("create output file {}", self.path.display()))?;
        let mut out = BufWriter::new(file);

        let mut written = 0usize;
        for item in elements(data) {
            let line = match item {
                Value::String(line) => writeln!(out, "{}", line.trim_end_matches('\n')),
                other => writeln!(out, "{}", other),
            };
            line.with_context(|| format!("write to {}", self.path.display()))?;
            written += 1;
        }
        out.flush()
            .with_context(|| format!("flush {}", self.path.display()))?;

        info!(path = %self.path.display(), lines = written, "done writing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    #[test]
    fn reads_lines_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, "INFO a\nWARN b\n").unwrap();

        let reader = FileReader::new(&path);
        let output = reader.produce().unwrap();
        assert!(output.is_lazy());
        assert_eq!(output.materialize().unwrap(), json!(["INFO a", "WARN b"]));
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileReader::new(dir.path().join("nope.txt"))
            .produce()
            .unwrap_err();
        assert!(err.to_string().contains("open input file"));
    }

    #[test]
    fn writes_one_line_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let data = json!(["first", "second\n", 3, {"k": true}]);

        FileWriter::new(&path)
            .consume(Inputs::new(vec![&data]))
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "first\nsecond\n3\n{\"k\":true}\n"
        );
    }
}
