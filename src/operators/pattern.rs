//! Regex-driven operators over string items.

use crate::graph::{Inputs, Output, Transform, elements};
use anyhow::{Context, anyhow};
use regex::Regex;
use serde_json::Value;

fn compile(pattern: &str) -> anyhow::Result<Regex> {
    Regex::new(pattern).with_context(|| format!("compile regex pattern {:?}", pattern))
}

fn text(item: &Value) -> anyhow::Result<&str> {
    item.as_str()
        .ok_or_else(|| anyhow!("expected a string item, got {}", item))
}

/// Keeps string items matching the pattern anywhere in the item.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    pattern: Regex,
}

impl RegexFilter {
    pub fn new(pattern: &str) -> anyhow::Result<Self> {
        Ok(Self {
            pattern: compile(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Transform for RegexFilter {
    fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        let data = inputs.single()?;
        Ok(Output::lazy_fallible(elements(data).filter_map(
            move |item| match text(item) {
                Ok(line) => self.pattern.is_match(line).then(|| Ok(item.clone())),
                Err(e) => Some(Err(e)),
            },
        )))
    }
}

/// Replaces each string item with its first match: the first capture group
/// when the pattern has one, the whole match otherwise.
#[derive(Debug, Clone)]
pub struct RegexMapper {
    pattern: Regex,
}

impl RegexMapper {
    pub fn new(pattern: &str) -> anyhow::Result<Self> {
        Ok(Self {
            pattern: compile(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn first_match(&self, item: &Value) -> anyhow::Result<Value> {
        let line = text(item)?;
        let caps = self
            .pattern
            .captures(line)
            .ok_or_else(|| anyhow!("no match for {:?} in {:?}", self.pattern.as_str(), line))?;
        let group = if caps.len() > 1 { caps.get(1) } else { caps.get(0) };
        Ok(Value::String(
            group.map(|m| m.as_str()).unwrap_or_default().to_string(),
        ))
    }
}

impl Transform for RegexMapper {
    fn transform<'a>(&'a self, inputs: Inputs<'a>) -> anyhow::Result<Output<'a>> {
        let data = inputs.single()?;
        Ok(Output::lazy_fallible(
            elements(data).map(move |item| self.first_match(item)),
        ))
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
    fn filter_keeps_matching_lines() {
        let filter = RegexFilter::new("^INFO").unwrap();
        let lines = json!(["INFO boot", "WARN disk", "INFO ready", "xINFO"]);
        assert_eq!(run(&filter, &lines).unwrap(), json!(["INFO boot", "INFO ready"]));
    }

    #[test]
    fn filter_rejects_non_string_items() {
        let filter = RegexFilter::new("1").unwrap();
        let err = run(&filter, &json!(["1", 1])).unwrap_err();
        assert!(err.to_string().contains("expected a string item"));
    }

    #[test]
    fn mapper_prefers_the_first_group() {
        let mapper = RegexMapper::new(r"ping from (\S+)").unwrap();
        let lines = json!(["ping from 10.0.0.1 ok", "ping from host-b"]);
        assert_eq!(run(&mapper, &lines).unwrap(), json!(["10.0.0.1", "host-b"]));

        let whole = RegexMapper::new(r"\d+").unwrap();
        assert_eq!(run(&whole, &json!(["id=42;"])).unwrap(), json!(["42"]));
    }

    #[test]
    fn mapper_fails_on_unmatched_item() {
        let mapper = RegexMapper::new(r"\d+").unwrap();
        assert!(run(&mapper, &json!(["7", "none"])).is_err());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = RegexFilter::new("(").unwrap_err();
        assert!(err.to_string().contains("compile regex pattern"));
    }
}
