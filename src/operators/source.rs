use crate::graph::{Output, Source};
use serde_json::Value;
use tracing::info;

/// Produces nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySource;

impl Source for EmptySource {
    fn produce(&self) -> anyhow::Result<Output<'_>> {
        info!("empty source: no-op");
        Ok(Output::none())
    }
}

/// Produces a fixed list of values, either as one array or as a one-shot
/// lazy sequence.
#[derive(Debug, Clone)]
pub struct Values {
    items: Vec<Value>,
    lazy: bool,
}

impl Values {
    pub fn new(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            lazy: false,
        }
    }

    pub fn lazy(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self {
            lazy: true,
            ..Self::new(items)
        }
    }
}

impl Source for Values {
    fn produce(&self) -> anyhow::Result<Output<'_>> {
        if self.lazy {
            Ok(Output::lazy(self.items.iter().cloned()))
        } else {
            Ok(Output::Value(Value::Array(self.items.clone())))
        }
    }
}
