//! Result types returned by connections

/// A row from a query result.
///
/// Values are kept in their text form as returned by the simple query
/// protocol; `None` is SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Column values
    pub values: Vec<Option<String>>,
    /// Column names
    columns: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(columns: Vec<String>, values: Vec<Option<String>>) -> Self {
        Self { values, columns }
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Get a value by column name
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.get(idx))
    }

    /// Parse the value at `index` as an unsigned integer
    pub fn get_u64(&self, index: usize) -> Option<u64> {
        self.get(index).and_then(|v| v.trim().parse().ok())
    }

    /// Get column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Query result
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Row>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Create a new empty query result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result from column names and text rows
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect();
        Self {
            columns,
            rows,
            execution_time_ms: 0,
        }
    }

    /// Check if the result has rows
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First column of the first row, if any
    pub fn scalar(&self) -> Option<&str> {
        self.rows.first().and_then(|row| row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup_by_name() {
        let row = Row::new(
            vec!["table_name".into(), "count".into()],
            vec![Some("users".into()), Some(" 42 ".into())],
        );

        assert_eq!(row.get_by_name("table_name"), Some("users"));
        assert_eq!(row.get_u64(1), Some(42));
        assert_eq!(row.get_by_name("missing"), None);
    }

    #[test]
    fn test_null_value_is_none() {
        let row = Row::new(vec!["count".into()], vec![None]);

        assert_eq!(row.get(0), None);
        assert_eq!(row.get_u64(0), None);
    }

    #[test]
    fn test_scalar() {
        let result = QueryResult::from_rows(vec!["count".into()], vec![vec![Some("7".into())]]);

        assert!(result.has_rows());
        assert_eq!(result.scalar(), Some("7"));
        assert_eq!(QueryResult::empty().scalar(), None);
    }
}
