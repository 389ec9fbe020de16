//! Column merging for lists.
//!
//! Every element of a list contributes cells to named columns. Columns are
//! created in first-seen order and padded with blank cells so a late column
//! still lines up with the element that introduced it.

use super::format::format_scalar;
use super::{LINKS_FIELD, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Column {
    /// Table header. Empty for scalars that sit directly in a list.
    pub header: String,
    /// Dotted path relative to the list, used for hidden-field checks.
    pub path: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Columns(Vec<Column>);

impl Columns {
    fn entry(&mut self, header: &str, path: &str) -> &mut Column {
        let index = match self.0.iter().position(|column| column.header == header) {
            Some(index) => index,
            None => {
                self.0.push(Column {
                    header: header.to_string(),
                    path: path.to_string(),
                    cells: Vec::new(),
                });
                self.0.len() - 1
            }
        };
        &mut self.0[index]
    }

    /// Fold columns of a nested field into this set, renaming them after
    /// the field that holds them.
    fn absorb(&mut self, key: &str, nested: Columns) {
        for column in nested.0 {
            let header = if column.header.is_empty() {
                key.to_string()
            } else {
                format!("{} ({})", column.header, key)
            };
            let path = if column.path.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", key, column.path)
            };
            self.entry(&header, &path).cells.extend(column.cells);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn items_placeholder(count: usize) -> String {
    format!("[{} items]", count)
}

/// Columns for a list. `depth` is the remaining budget of the list itself;
/// each element is flattened with one level less.
pub(crate) fn list_columns(items: &[Node], depth: i32) -> Columns {
    let mut merged = Columns::default();
    let mut rows = 0;

    for item in items {
        let start = rows;
        let mut grown = 0;

        match item {
            Node::Object(fields) => {
                for column in object_columns(fields, depth - 1).0 {
                    grown = grown.max(column.cells.len());
                    let target = merged.entry(&column.header, &column.path);
                    pad_to(&mut target.cells, start);
                    target.cells.extend(column.cells);
                }
            }
            Node::Scalar(scalar) => {
                push_bare(&mut merged, start, format_scalar(scalar));
                grown = 1;
            }
            Node::List(inner) => {
                push_bare(&mut merged, start, items_placeholder(inner.len()));
                grown = 1;
            }
        }

        rows += grown;
    }

    merged
}

fn push_bare(merged: &mut Columns, start: usize, cell: String) {
    let target = merged.entry("", "");
    pad_to(&mut target.cells, start);
    target.cells.push(cell);
}

fn pad_to(cells: &mut Vec<String>, len: usize) {
    if cells.len() < len {
        cells.resize(len, String::new());
    }
}

/// Columns contributed by one object element.
fn object_columns(fields: &[(String, Node)], depth: i32) -> Columns {
    let mut columns = Columns::default();
    if depth <= 0 {
        return columns;
    }

    for (key, node) in fields {
        if let Node::Scalar(scalar) = node {
            columns.entry(key, key).cells.push(format_scalar(scalar));
        }
    }

    if depth > 1 {
        for (key, node) in fields {
            if let Node::Object(inner) = node {
                columns.absorb(key, object_columns(inner, depth - 1));
            }
        }
    }

    for (key, node) in fields {
        let Node::List(items) = node else { continue };
        if key == LINKS_FIELD {
            continue;
        }
        if depth > 1 {
            columns.absorb(key, list_columns(items, depth));
        } else {
            columns.entry(key, key).cells = vec![items_placeholder(items.len())];
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(value: serde_json::Value, depth: i32) -> Vec<(String, String, Vec<String>)> {
        let Node::List(items) = Node::from(&value) else {
            panic!("expected a list");
        };
        list_columns(&items, depth)
            .iter()
            .map(|column| (column.header.clone(), column.path.clone(), column.cells.clone()))
            .collect()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_merges_same_named_fields() {
        let cols = columns(json!([{"name": "p1", "mtu": 1500}, {"name": "p2", "mtu": 9000}]), 2);
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0], ("name".into(), "name".into(), cells(&["p1", "p2"])));
        assert_eq!(cols[1], ("mtu".into(), "mtu".into(), cells(&["1500", "9000"])));
    }

    #[test]
    fn test_late_columns_are_padded() {
        let cols = columns(json!([{"name": "p1"}, {"name": "p2", "peer": "veth1"}]), 2);
        assert_eq!(cols[1].2, cells(&["", "veth1"]));
    }

    #[test]
    fn test_scalars_go_to_headerless_column() {
        let cols = columns(json!(["a", 2, true, null]), 2);
        assert_eq!(cols, vec![(String::new(), String::new(), cells(&["a", "2", "true", "null"]))]);
    }

    #[test]
    fn test_nested_lists_flatten_with_renamed_headers() {
        let cols = columns(
            json!([
                {"name": "br1", "ports": [{"name": "p1"}, {"name": "p2"}]},
                {"name": "br2", "ports": [{"name": "p3"}]}
            ]),
            3,
        );
        assert_eq!(cols[0], ("name".into(), "name".into(), cells(&["br1", "", "br2"])));
        assert_eq!(
            cols[1],
            ("name (ports)".into(), "ports.name".into(), cells(&["p1", "p2", "p3"]))
        );
    }

    #[test]
    fn test_nested_lists_collapse_without_budget() {
        let cols = columns(json!([{"name": "br1", "ports": [{"name": "p1"}, {"name": "p2"}]}]), 2);
        assert_eq!(cols[1], ("ports".into(), "ports".into(), cells(&["[2 items]"])));
    }

    #[test]
    fn test_nested_objects_flatten() {
        let cols = columns(json!([{"name": "c1", "stats": {"rx": 1, "tx": 2}}]), 3);
        assert_eq!(cols[1], ("rx (stats)".into(), "stats.rx".into(), cells(&["1"])));
        assert_eq!(cols[2], ("tx (stats)".into(), "stats.tx".into(), cells(&["2"])));
    }

    #[test]
    fn test_links_are_skipped() {
        let cols = columns(json!([{"name": "c1", "_links": [{"rel": "self"}]}]), 3);
        assert_eq!(cols.len(), 1);
    }

    #[test]
    fn test_no_budget_yields_no_columns() {
        assert!(columns(json!([{"name": "c1"}]), 1).is_empty());
        assert!(columns(json!([]), 2).is_empty());
    }
}
