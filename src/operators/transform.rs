use crate::graph::{Inputs, Output, Transform, elements};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Passes its single input through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Transform for Identity {
    fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        Ok(Output::Value(inputs.single()?.clone()))
    }
}

/// Fan-out point: hands an unchanged copy of its input to every downstream
/// node.
#[derive(Debug, Default, Clone, Copy)]
pub struct Splitter;

impl Transform for Splitter {
    fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        let data = inputs.single()?;
        debug!(items = elements(data).len(), "splitting stream");
        Ok(Output::Value(data.clone()))
    }
}

/// Keeps the items of its input for which the predicate holds.
pub struct Filter {
    predicate: Box<dyn Fn(&Value) -> bool>,
}

impl Filter {
    pub fn new(predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl Transform for Filter {
    fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        let data = inputs.single()?;
        Ok(Output::lazy(
            elements(data)
                .filter(move |item| (self.predicate)(*item))
                .cloned(),
        ))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter { .. }")
    }
}

/// Maps every item of its input.
pub struct Mapper {
    map: Box<dyn Fn(&Value) -> anyhow::Result<Value>>,
}

impl Mapper {
    pub fn new(map: impl Fn(&Value) -> anyhow::Result<Value> + 'static) -> Self {
        Self { map: Box::new(map) }
    }
}

impl Transform for Mapper {
    fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        let data = inputs.single()?;
        Ok(Output::lazy_fallible(
            elements(data).map(move |item| (self.map)(item)),
        ))
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mapper { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(op: &dyn Transform, input: &Value) -> anyhow::Result<Value> {
        op.transform(Inputs::new(vec![input]))?.materialize()
    }

    #[test]
    fn filter_drops_rejected_items() {
        let filter = Filter::new(|v| v != "y");
        assert_eq!(run(&filter, &json!(["x", "y"])).unwrap(), json!(["x"]));
    }

    #[test]
    fn mapper_maps_items_and_propagates_errors() {
        let double = Mapper::new(|v| {
            let n = v.as_i64().ok_or_else(|| anyhow::anyhow!("not a number: {v}"))?;
            Ok(json!(n * 2))
        });
        assert_eq!(run(&double, &json!([1, 2])).unwrap(), json!([2, 4]));
        assert!(run(&double, &json!([1, "two"])).is_err());
    }

    #[test]
    fn identity_and_splitter_pass_through() {
        let data = json!({"k": [1, 2]});
        assert_eq!(run(&Identity, &data).unwrap(), data);
        assert_eq!(run(&Splitter, &data).unwrap(), data);
    }
}
