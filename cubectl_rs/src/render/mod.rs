//! Tree pretty-printer for JSON responses.
//!
//! A response is parsed once into a [`Node`] and walked recursively with a
//! depth budget. Objects print their scalar fields first, then nested
//! objects, then lists. Lists become tables whose columns merge same-named
//! fields across elements.
//!
//! # Module Structure
//!
//! - [`printer`] - the recursive walk and hidden-field suppression
//! - `table` - column merging for lists
//! - [`columns`] - the column formatter (also used by help pages)
//! - [`format`] - scalar formatting

pub mod columns;
pub mod format;
pub mod printer;
mod table;

use serde_json::{Number, Value};

use crate::cli::command::HiddenFields;
use crate::error::RenderError;

pub use printer::Printer;

/// Cross-reference field that is never rendered.
pub(crate) const LINKS_FIELD: &str = "_links";

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// A parsed response value. Object fields keep their document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    List(Vec<Node>),
    Object(Vec<(String, Node)>),
}

impl Node {
    pub fn parse(bytes: &[u8]) -> Result<Self, RenderError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Node::from(&value))
    }

    /// Field lookup on objects; `None` for anything else.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(fields) => fields
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, node)| node),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(value) => Node::Scalar(Scalar::Bool(*value)),
            Value::Number(value) => Node::Scalar(Scalar::Number(value.clone())),
            Value::String(value) => Node::Scalar(Scalar::String(value.clone())),
            Value::Array(items) => Node::List(items.iter().map(Node::from).collect()),
            Value::Object(fields) => Node::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), Node::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Render a value with the given hidden paths and depth budget.
pub fn render(node: &Node, hidden: &HiddenFields, depth: i32) -> String {
    Printer::new(hidden).render(node, depth)
}

/// Parse raw JSON bytes and render them. Invalid JSON produces no output.
pub fn render_json(bytes: &[u8], hidden: &HiddenFields, depth: i32) -> Result<String, RenderError> {
    Ok(render(&Node::parse(bytes)?, hidden, depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_field_order() {
        let node = Node::parse(br#"{"zeta": 1, "alpha": 2}"#).unwrap();
        let Node::Object(fields) = node else {
            panic!("expected an object");
        };
        let keys: Vec<&str> = fields.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(Node::parse(b"{not json").is_err());
        assert!(render_json(b"", &HiddenFields::new(), 2).is_err());
    }

    #[test]
    fn test_get_and_as_str() {
        let node = Node::parse(br#"{"name": "br1", "mtu": 1500}"#).unwrap();
        assert_eq!(node.get("name").and_then(Node::as_str), Some("br1"));
        assert_eq!(node.get("mtu").and_then(Node::as_str), None);
        assert_eq!(node.get("missing"), None);
    }

    #[test]
    fn test_render_json() {
        let out = render_json(br#"{"a": 1, "b": {"c": 2}}"#, &HiddenFields::new(), 2).unwrap();
        assert_eq!(out, "a: 1\nb:\n c: 2\n");
    }
}
