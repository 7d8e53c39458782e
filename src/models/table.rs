use serde::{Deserialize, Serialize};

/// A whole logical table as the backing store sees it: a header row and
/// string cells. Blank cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column name). Missing columns and short rows read as "".
    pub fn cell(&self, row: usize, column: &str) -> &str {
        self.column_index(column)
            .and_then(|i| self.rows.get(row).and_then(|r| r.get(i)))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Vec<&str> {
        (0..self.rows.len()).map(|r| self.cell(r, name)).collect()
    }
}
