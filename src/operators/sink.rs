use crate::graph::{Inputs, Sink, elements};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Consumes its input and does nothing with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl Sink for NoOpSink {
    fn consume(&self, inputs: Inputs<'_>) -> anyhow::Result<()> {
        inputs.single()?;
        info!("no-op sink");
        Ok(())
    }
}

pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Logs every item of its input, grouped into batches.
#[derive(Debug, Clone)]
pub struct LogWriter {
    batch_size: usize,
}

impl LogWriter {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl Sink for LogWriter {
    fn consume(&self, inputs: Inputs<'_>) -> anyhow::Result<()> {
        let items = elements(inputs.single()?).as_slice();
        for (batch_no, batch) in items.chunks(self.batch_size).enumerate() {
            info!(batch = batch_no, size = batch.len(), "writing batch");
            for (idx, item) in batch.iter().enumerate() {
                match item {
                    Value::String(text) => info!(idx, "{}", text.trim_end_matches('\n')),
                    other => info!(idx, "{}", other),
                }
            }
        }
        Ok(())
    }
}

/// Shared handle to the value a [`Collector`] received.
#[derive(Debug, Clone, Default)]
pub struct Collected(Rc<RefCell<Option<Value>>>);

impl Collected {
    pub fn get(&self) -> Option<Value> {
        self.0.borrow().clone()
    }

    pub fn take(&self) -> Option<Value> {
        self.0.borrow_mut().take()
    }
}

/// Records its input so the embedding program can read it after a run.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    slot: Collected,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Collected {
        self.slot.clone()
    }
}

impl Sink for Collector {
    fn consume(&self, inputs: Inputs<'_>) -> anyhow::Result<()> {
        let value = inputs.single()?.clone();
        *self.slot.0.borrow_mut() = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn collector_keeps_the_last_input() {
        let collector = Collector::new();
        let handle = collector.handle();
        assert_eq!(handle.get(), None);

        let first = json!(["a"]);
        collector.consume(Inputs::new(vec![&first])).unwrap();
        let second = json!(["b"]);
        collector.consume(Inputs::new(vec![&second])).unwrap();

        assert_eq!(handle.take(), Some(second));
        assert_eq!(handle.get(), None);
    }

    #[test]
    fn sinks_take_exactly_one_input() {
        let a = json!(1);
        let b = json!(2);
        assert!(NoOpSink.consume(Inputs::new(vec![&a, &b])).is_err());
        assert!(LogWriter::default().consume(Inputs::default()).is_err());
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let items = json!(["a", "b", "c"]);
        LogWriter::new(0).consume(Inputs::new(vec![&items])).unwrap();
    }
}
