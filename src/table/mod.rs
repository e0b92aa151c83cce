// src/table/mod.rs
use std::fmt;

pub mod parse;
pub mod write;

pub use parse::{parse_table, parse_table_with, DecodePolicy};
pub use write::to_csv;

/// A single cell. Typing is best-effort; only header labels carry meaning
/// downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Field {
    /// Infer a field from its raw text.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Field::Empty;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Field::Int(i);
        }
        if looks_numeric(raw) {
            if let Ok(f) = raw.parse::<f64>() {
                if f.is_finite() {
                    return Field::Float(f);
                }
            }
        }
        Field::Text(raw.to_string())
    }
}

/// Digits with optional sign, decimal point and exponent. Keeps words such as
/// `inf` or `NaN` out of the float path.
fn looks_numeric(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Empty => Ok(()),
            Field::Int(i) => write!(f, "{i}"),
            // integral floats keep a fractional digit so they re-read as floats
            Field::Float(v) if v.fract() == 0.0 => write!(f, "{v:.1}"),
            Field::Float(v) => write!(f, "{v}"),
            Field::Text(s) => f.write_str(s),
        }
    }
}

/// Header row plus data rows. Every row holds exactly one field per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Field>>,
}

impl Table {
    /// Build a table, padding short rows with [`Field::Empty`] and dropping
    /// fields beyond the last column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Field>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Field::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Field>] {
        &self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Field of `row` under column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Field> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Swap the header label at `index`. Row data is untouched.
    pub(crate) fn relabel(&mut self, index: usize, name: String) {
        if let Some(slot) = self.columns.get_mut(index) {
            *slot = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_numbers_text_and_empty() {
        assert_eq!(Field::infer(""), Field::Empty);
        assert_eq!(Field::infer("42"), Field::Int(42));
        assert_eq!(Field::infer("-7"), Field::Int(-7));
        assert_eq!(Field::infer("3.25"), Field::Float(3.25));
        assert_eq!(Field::infer("1e3"), Field::Float(1000.0));
        assert_eq!(Field::infer("inf"), Field::Text("inf".into()));
        assert_eq!(Field::infer("NaN"), Field::Text("NaN".into()));
        assert_eq!(Field::infer(" 12"), Field::Text(" 12".into()));
        assert_eq!(Field::infer("12.5%"), Field::Text("12.5%".into()));
        assert_eq!(Field::infer("2024-01-05"), Field::Text("2024-01-05".into()));
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(Field::Empty.to_string(), "");
        assert_eq!(Field::Int(1200).to_string(), "1200");
        assert_eq!(Field::Float(1000.0).to_string(), "1000.0");
        assert_eq!(Field::Float(0.125).to_string(), "0.125");
        assert_eq!(Field::infer("1.50").to_string(), "1.5");
        assert_eq!(Field::Text("a,b".into()).to_string(), "a,b");
    }

    #[test]
    fn new_pads_and_truncates_rows() {
        let t = Table::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Field::Int(1)],
                vec![Field::Int(1), Field::Int(2), Field::Int(3)],
            ],
        );
        assert_eq!(t.rows()[0], vec![Field::Int(1), Field::Empty]);
        assert_eq!(t.rows()[1], vec![Field::Int(1), Field::Int(2)]);
        assert_eq!(t.get(1, "b"), Some(&Field::Int(2)));
        assert_eq!(t.get(0, "missing"), None);
        assert_eq!(t.head(1).num_rows(), 1);
        assert_eq!(t.head(10).num_rows(), 2);
    }
}
