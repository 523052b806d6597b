//! Table types.

use serde::{Deserialize, Serialize};

/// A table as a grid of text cells. The first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table, top to bottom
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows of strings.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows.into_iter().map(TableRow::from_strings).collect(),
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns: the widest row wins, short rows are padded on output.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// True when the table has no rows or every cell is blank.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_blank())
    }

    /// The header row, if any.
    pub fn header(&self) -> Option<&TableRow> {
        self.rows.first()
    }

    /// Rows after the header.
    pub fn body(&self) -> &[TableRow] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Tab/newline separated plain text of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.cells.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cell texts, left to right. Empty string for an empty cell.
    pub cells: Vec<String>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(Into::into).collect())
    }

    /// True when every cell is whitespace.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.header().is_none());
        assert!(table.body().is_empty());
    }

    #[test]
    fn test_table_with_data() {
        let table = Table::from_rows(vec![
            vec!["Name", "Age"],
            vec!["Alice", "30"],
            vec!["Bob", "25"],
        ]);

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.header().unwrap().cells, vec!["Name", "Age"]);
        assert_eq!(table.body().len(), 2);
        assert_eq!(table.plain_text(), "Name\tAge\nAlice\t30\nBob\t25");
    }

    #[test]
    fn test_ragged_rows_widest_wins() {
        let table = Table::from_rows(vec![vec!["a"], vec!["b", "c", "d"]]);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_blank_table_is_empty() {
        let table = Table::from_rows(vec![vec!["", " "], vec!["\t", ""]]);
        assert!(table.is_empty());
    }
}
