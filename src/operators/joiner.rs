//! Fan-in operators.

use crate::graph::{Inputs, Output, Transform, elements};
use anyhow::bail;
use serde_json::Value;
use std::fmt;

type Reducer = Box<dyn Fn(Value, &Value) -> anyhow::Result<Value>>;

/// Reduces any number of inputs to one value with an associative combining
/// function. Inputs are folded in upstream declaration order, so the order
/// matters for non-commutative reducers.
pub struct Joiner {
    reducer: Reducer,
}

impl Joiner {
    pub fn new(reducer: impl Fn(Value, &Value) -> anyhow::Result<Value> + 'static) -> Self {
        Self {
            reducer: Box::new(reducer),
        }
    }

    /// Joiner that concatenates all input streams into one.
    pub fn concatenate() -> Self {
        Self::new(concatenate)
    }
}

impl Transform for Joiner {
    fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        let mut values = inputs.iter();
        let Some(first) = values.next() else {
            bail!("joiner requires at least one input");
        };
        let joined = values.try_fold(first.clone(), |acc, next| (self.reducer)(acc, next))?;
        Ok(Output::Value(joined))
    }
}

impl fmt::Debug for Joiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Joiner { .. }")
    }
}

/// Append the items of `next` to `acc`, treating both as sequences.
pub fn concatenate(acc: Value, next: &Value) -> anyhow::Result<Value> {
    let mut items = match acc {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    };
    items.extend(elements(next).cloned());
    Ok(Value::Array(items))
}
