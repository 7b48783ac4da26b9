//! Column-major string table, the loader's raw input shape.
//!
//! Foreign CSV exports arrive as rows of untyped cells; the engine only ever
//! reads two columns of them, so the table is stored column-major. Cells stay
//! strings until [`normalize`](crate::normalize) coerces them.

/// A raw tabular source: named columns of untyped cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    columns: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        let columns = vec![Vec::new(); headers.len()];
        Self { headers, columns }
    }

    /// Append one row. Short rows are padded with empty cells, extra cells
    /// are ignored, so ragged sources stay loadable.
    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = row.into_iter();
        for column in &mut self.columns {
            column.push(cells.next().map(Into::into).unwrap_or_default());
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Cells of the named column, if present. Exact header match; column
    /// identification heuristics live in [`columns`](crate::columns).
    pub fn column(&self, name: &str) -> Option<&[String]> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(&self.columns[idx])
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_columns() {
        let mut t = RawTable::new(vec!["Step".into(), "Value".into()]);
        t.push_row(["0", "1.5"]);
        t.push_row(["1", "2.5"]);

        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column("Step").unwrap(), &["0", "1"]);
        assert_eq!(t.column("Value").unwrap(), &["1.5", "2.5"]);
        assert_eq!(t.column("missing"), None);
    }

    #[test]
    fn short_rows_are_padded() {
        let mut t = RawTable::new(vec!["a".into(), "b".into(), "c".into()]);
        t.push_row(["1"]);

        assert_eq!(t.column("b").unwrap(), &[""]);
        assert_eq!(t.column("c").unwrap(), &[""]);
    }

    #[test]
    fn extra_cells_are_dropped() {
        let mut t = RawTable::new(vec!["a".into()]);
        t.push_row(["1", "spill"]);

        assert_eq!(t.row_count(), 1);
        assert_eq!(t.column("a").unwrap(), &["1"]);
    }

    #[test]
    fn headerless_table_is_empty() {
        let mut t = RawTable::new(vec![]);
        t.push_row(["1", "2"]);
        assert_eq!(t.row_count(), 0);
    }
}
