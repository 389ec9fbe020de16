//! Column formatter shared by tables and help pages.
//!
//! Cells are left-aligned by display width and separated by two spaces. The
//! last cell of a row is never padded, and it is the only one that wraps when
//! a maximum width is set.

use console::measure_text_width;

pub const GLUE: &str = "  ";

/// The last column never shrinks below this when wrapping.
const MIN_LAST_WIDTH: usize = 12;

#[derive(Debug, Clone, Default)]
pub struct ColumnFormat {
    prefix: String,
    max_width: Option<usize>,
}

impl ColumnFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.prefix = " ".repeat(indent);
        self
    }

    pub fn max_width(mut self, max_width: Option<usize>) -> Self {
        self.max_width = max_width;
        self
    }

    /// Format rows into lines, each terminated by `\n`. Rows may have
    /// different lengths.
    pub fn format(&self, rows: &[Vec<String>]) -> String {
        let widths = self.widths(rows);
        let mut out = String::new();

        for row in rows {
            let Some((last, leading)) = row.split_last() else {
                out.push('\n');
                continue;
            };

            let mut head = self.prefix.clone();
            for (cell, width) in leading.iter().zip(&widths) {
                push_padded(&mut head, cell, *width);
                head.push_str(GLUE);
            }

            let limit = widths.get(leading.len()).copied().unwrap_or(0);
            let chunks = if measure_text_width(last) > limit {
                wrap_words(last, limit)
            } else {
                vec![last.clone()]
            };

            let blank_head = " ".repeat(measure_text_width(&head));
            for (index, chunk) in chunks.iter().enumerate() {
                let line = if index == 0 {
                    format!("{}{}", head, chunk)
                } else {
                    format!("{}{}", blank_head, chunk)
                };
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }

        out
    }

    fn widths(&self, rows: &[Vec<String>]) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in rows {
            for (index, cell) in row.iter().enumerate() {
                let width = measure_text_width(cell);
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }

        if let Some(max_width) = self.max_width {
            let total = self.prefix.len()
                + widths.iter().sum::<usize>()
                + GLUE.len() * widths.len().saturating_sub(1);
            if let Some(last) = widths.last_mut()
                && total > max_width
            {
                let excess = total - max_width;
                *last = last.saturating_sub(excess).max(MIN_LAST_WIDTH.min(*last));
            }
        }

        widths
    }
}

fn push_padded(out: &mut String, cell: &str, width: usize) {
    out.push_str(cell);
    let used = measure_text_width(cell);
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
}

/// Greedy word wrap. A word longer than `width` gets a line of its own.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            measure_text_width(word)
        } else {
            measure_text_width(&current) + 1 + measure_text_width(word)
        };
        if candidate > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
