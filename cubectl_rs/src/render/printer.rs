//! Recursive walk over a [`Node`].

use super::columns::ColumnFormat;
use super::format::format_scalar;
use super::table::list_columns;
use super::{LINKS_FIELD, Node};
use crate::cli::command::HiddenFields;

/// Renders nodes into indented text.
///
/// Hidden paths are fully qualified dotted names from the root, so `name`
/// and `ports.name` are distinct.
#[derive(Debug, Clone)]
pub struct Printer<'h> {
    hidden: &'h HiddenFields,
    max_width: Option<usize>,
}

impl<'h> Printer<'h> {
    pub fn new(hidden: &'h HiddenFields) -> Self {
        Self {
            hidden,
            max_width: None,
        }
    }

    /// Wrap the last table column so lines fit in `max_width` columns.
    pub fn max_width(mut self, max_width: Option<usize>) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn render(&self, node: &Node, depth: i32) -> String {
        let mut out = String::new();
        self.node(&mut out, 0, "", node, depth);
        out
    }

    fn is_hidden(&self, path: &str, key: &str) -> bool {
        self.hidden.contains(&format!("{}{}", path, key))
    }

    fn node(&self, out: &mut String, indent: usize, path: &str, node: &Node, depth: i32) {
        if depth <= 0 {
            return;
        }
        let pad = " ".repeat(indent);
        match node {
            Node::Scalar(scalar) => {
                out.push_str(&format!("{}{}\n", pad, format_scalar(scalar)));
            }
            Node::List(items) if depth == 1 => {
                out.push_str(&format!("{}[{} items]\n", pad, items.len()));
            }
            Node::List(items) => self.table(out, indent, path, items, depth),
            Node::Object(fields) => self.object(out, indent, path, fields, depth),
        }
    }

    fn object(&self, out: &mut String, indent: usize, path: &str, fields: &[(String, Node)], depth: i32) {
        let pad = " ".repeat(indent);

        for (key, node) in fields {
            let Node::Scalar(scalar) = node else { continue };
            if self.is_hidden(path, key) {
                continue;
            }
            out.push_str(&format!("{}{}: {}\n", pad, key, format_scalar(scalar)));
        }

        for (key, node) in fields {
            if !matches!(node, Node::Object(_)) || self.is_hidden(path, key) {
                continue;
            }
            out.push_str(&format!("{}{}:\n", pad, key));
            self.node(out, indent + 1, &format!("{}{}.", path, key), node, depth);
        }

        for (key, node) in fields {
            let Node::List(items) = node else { continue };
            if key == LINKS_FIELD || self.is_hidden(path, key) {
                continue;
            }
            if depth > 1 {
                out.push_str(&format!("\n{}{}:\n", pad, key));
                self.table(out, indent + 1, &format!("{}{}.", path, key), items, depth);
            } else {
                out.push_str(&format!("{}{}: [{} items]\n", pad, key, items.len()));
            }
        }
    }

    fn table(&self, out: &mut String, indent: usize, path: &str, items: &[Node], depth: i32) {
        let columns = list_columns(items, depth);
        if columns.is_empty() {
            return;
        }
        let visible: Vec<_> = columns
            .iter()
            .filter(|column| !self.is_hidden(path, &column.path))
            .collect();
        if visible.is_empty() {
            return;
        }

        let height = visible.iter().map(|column| column.cells.len()).max().unwrap_or(0);
        let mut rows = Vec::with_capacity(height + 1);
        if visible.iter().any(|column| !column.header.is_empty()) {
            rows.push(visible.iter().map(|column| column.header.clone()).collect::<Vec<_>>());
        }
        for row in 0..height {
            rows.push(
                visible
                    .iter()
                    .map(|column| column.cells.get(row).cloned().unwrap_or_default())
                    .collect(),
            );
        }

        out.push_str(
            &ColumnFormat::new()
                .indent(indent)
                .max_width(self.max_width)
                .format(&rows),
        );
    }
}
