//! Box-drawn tables for `console.table`.

use core_types::Value;

const INDEX_HEADER: &str = "(index)";
const ITERATION_HEADER: &str = "(iteration index)";
const KEY_HEADER: &str = "Key";
const VALUES_HEADER: &str = "Values";

/// A table ready to be drawn: a header row and data rows of equal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column headers
    pub header: Vec<String>,
    /// Cell text, one `Vec` per row
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Lays out tabular data.
    ///
    /// Returns `None` when `data` is not tabular (primitives, functions),
    /// in which case the caller logs it instead. When `properties` is given
    /// only those columns are shown.
    pub fn from_value(data: &Value, properties: Option<&[String]>) -> Option<Self> {
        let (index_header, rows): (&str, Vec<(String, Option<&Value>, &Value)>) = match data {
            Value::Array { items, .. } => (
                INDEX_HEADER,
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), None, item))
                    .collect(),
            ),
            Value::Object { entries, .. } => (
                INDEX_HEADER,
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), None, value))
                    .collect(),
            ),
            Value::Map { entries, .. } => (
                ITERATION_HEADER,
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, (key, value))| (i.to_string(), Some(key), value))
                    .collect(),
            ),
            Value::Set { items, .. } => (
                ITERATION_HEADER,
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), None, item))
                    .collect(),
            ),
            _ => return None,
        };

        let has_keys = matches!(data, Value::Map { .. });
        let mut columns: Vec<String> = properties.map(<[String]>::to_vec).unwrap_or_default();
        if properties.is_none() {
            for (_, _, value) in &rows {
                for (key, _) in fields(value) {
                    if !columns.contains(&key) {
                        columns.push(key);
                    }
                }
            }
        }
        let has_values = rows.iter().any(|(_, _, value)| is_scalar(value));

        let mut header = vec![index_header.to_string()];
        if has_keys {
            header.push(KEY_HEADER.to_string());
        }
        header.extend(columns.iter().cloned());
        if has_values {
            header.push(VALUES_HEADER.to_string());
        }

        let rows = rows
            .into_iter()
            .map(|(index, key, value)| {
                let cells = fields(value);
                let mut row = vec![index];
                if has_keys {
                    row.push(key.map(ToString::to_string).unwrap_or_default());
                }
                for column in &columns {
                    let cell = cells
                        .iter()
                        .find(|(key, _)| key == column)
                        .map(|(_, v)| v.to_string())
                        .unwrap_or_default();
                    row.push(cell);
                }
                if has_values {
                    row.push(if is_scalar(value) {
                        value.to_string()
                    } else {
                        String::new()
                    });
                }
                row
            })
            .collect();

        Some(Self { header, rows })
    }

    /// Draws the table with box characters, one line per row.
    ///
    /// # Examples
    ///
    /// ```
    /// use builtins::Table;
    ///
    /// let table = Table {
    ///     header: vec!["(index)".to_string(), "Values".to_string()],
    ///     rows: vec![vec!["0".to_string(), "'a'".to_string()]],
    /// };
    /// assert_eq!(
    ///     table.render(),
    ///     "┌─────────┬────────┐\n\
    ///      │ (index) │ Values │\n\
    ///      ├─────────┼────────┤\n\
    ///      │ 0       │ 'a'    │\n\
    ///      └─────────┴────────┘"
    /// );
    /// ```
    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.header.len())
            .map(|column| {
                std::iter::once(&self.header)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
                    + 2
            })
            .collect();

        let border = |left: &str, middle: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            format!("{}{}{}", left, segments.join(middle), right)
        };
        let line = |row: &[String]| {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    let pad = width - 1 - cell.chars().count();
                    format!(" {}{}", cell, " ".repeat(pad))
                })
                .collect();
            format!("│{}│", cells.join("│"))
        };

        let mut lines = vec![border("┌", "┬", "┐"), line(&self.header), border("├", "┼", "┤")];
        lines.extend(self.rows.iter().map(|row| line(row)));
        lines.push(border("└", "┴", "┘"));
        lines.join("\n")
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object { .. } | Value::Array { .. })
}

/// The columns a row contributes: object properties or array indices.
fn fields(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object { entries, .. } => entries.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array { items, .. } => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}
