//! Tables of delimited records with named columns.
//!
//! A [`Table`] is the common currency between the store, the row expander
//! and the range resolver. Each [`Row`] holds exactly one [`Cell`] per
//! column of the header.

use std::collections::HashSet;

pub mod cell;

pub use cell::Cell;

/// An error related to a [`Table`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// A row did not hold one cell per column of the header.
    FieldCount {
        /// The number of columns in the header.
        expected: usize,

        /// The number of cells in the row.
        found: usize,
    },

    /// Two tables with different headers were combined.
    HeaderMismatch(Vec<String>, Vec<String>),

    /// A required column is not present in the header.
    MissingColumn(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::FieldCount { expected, found } => write!(
                f,
                "invalid number of fields in row: expected {expected} fields, found {found} \
                 fields"
            ),
            Error::HeaderMismatch(a, b) => write!(
                f,
                "mismatched headers: [{}] and [{}]",
                a.join(", "),
                b.join(", ")
            ),
            Error::MissingColumn(name) => write!(f, "missing column: {name}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A single row within a [`Table`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row(Vec<Cell>);

impl Row {
    /// Creates a new row from its cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    /// Gets the cells of the row.
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Gets the cell at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.0.get(index)
    }

    /// Gets the text of a single-valued cell at `index`.
    ///
    /// Returns [`None`] if the cell does not exist or holds a list.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Cell::as_value)
    }

    /// Replaces the cell at `index`.
    ///
    /// Out-of-bounds indices are ignored.
    pub fn set(&mut self, index: usize, cell: Cell) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = cell;
        }
    }

    /// Renders each cell of the row as text.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|cell| cell.to_string()).collect()
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self(cells)
    }
}

/// A table of rows under a header of column names.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    /// The column names.
    header: Vec<String>,

    /// The rows, in input order.
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the provided column names.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::Table;
    ///
    /// let table = Table::new(vec![String::from("Feature"), String::from("Consequence")]);
    /// assert_eq!(table.header().len(), 2);
    /// assert!(table.is_empty());
    /// ```
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Attempts to create a table from a header and its rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::table::Row;
    /// use pdbmapper::Table;
    ///
    /// let table = Table::try_from_parts(
    ///     vec![String::from("Feature")],
    ///     vec![Row::new(vec!["ENST00000263025".into()])],
    /// )?;
    /// assert_eq!(table.len(), 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_parts(header: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(header);

        for row in rows {
            table.push(row)?;
        }

        Ok(table)
    }

    /// Gets the column names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Gets the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes `self` and returns the header and the rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.header, self.rows)
    }

    /// Gets the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Gets the index of the column called `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|column| column == name)
    }

    /// Gets the index of the column called `name` or fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::Table;
    ///
    /// let table = Table::new(vec![String::from("Feature")]);
    /// assert_eq!(table.require_column("Feature")?, 0);
    ///
    /// let err = table.require_column("Pident").unwrap_err();
    /// assert_eq!(err.to_string(), "missing column: Pident");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Pushes a row onto the end of the table.
    pub fn push(&mut self, row: Row) -> Result<()> {
        if row.cells().len() != self.header.len() {
            return Err(Error::FieldCount {
                expected: self.header.len(),
                found: row.cells().len(),
            });
        }

        self.rows.push(row);
        Ok(())
    }

    /// Appends the rows of `other`, which must share the same header.
    pub fn append(&mut self, other: Table) -> Result<()> {
        if self.header != other.header {
            return Err(Error::HeaderMismatch(self.header.clone(), other.header));
        }

        self.rows.extend(other.rows);
        Ok(())
    }

    /// Retains only the rows for which `f` returns `true`.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(f)
    }

    /// Removes every row that renders identically to an earlier row.
    ///
    /// The first occurrence of each row is kept in place.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::table::Row;
    /// use pdbmapper::Table;
    ///
    /// let mut table = Table::try_from_parts(
    ///     vec![String::from("Structure_feature_id"), String::from("Uploaded_variation")],
    ///     vec![
    ///         Row::new(vec!["F1".into(), "V1".into()]),
    ///         Row::new(vec!["F2".into(), "V1".into()]),
    ///         Row::new(vec!["F1".into(), "V1".into()]),
    ///     ],
    /// )?;
    ///
    /// table.dedup();
    /// assert_eq!(table.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row.to_strings()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_push_with_wrong_field_count() {
        let mut table = Table::new(header(&["a", "b"]));
        let err = table.push(Row::new(vec!["1".into()])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid number of fields in row: expected 2 fields, found 1 fields"
        );
    }

    #[test]
    fn test_append_with_mismatched_headers() {
        let mut table = Table::new(header(&["a", "b"]));
        let err = table.append(Table::new(header(&["a", "c"]))).unwrap_err();
        assert_eq!(err.to_string(), "mismatched headers: [a, b] and [a, c]");
    }

    #[test]
    fn test_append_and_retain() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut table = Table::try_from_parts(
            header(&["a"]),
            vec![Row::new(vec!["1".into()]), Row::new(vec!["2".into()])],
        )?;
        table.append(Table::try_from_parts(
            header(&["a"]),
            vec![Row::new(vec!["3".into()])],
        )?)?;
        assert_eq!(table.len(), 3);

        table.retain(|row| row.value(0) != Some("2"));
        let values = table
            .rows()
            .iter()
            .filter_map(|row| row.value(0))
            .collect::<Vec<_>>();
        assert_eq!(values, vec!["1", "3"]);

        Ok(())
    }

    #[test]
    fn test_dedup_is_idempotent() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut table = Table::try_from_parts(
            header(&["feature", "variant"]),
            vec![
                Row::new(vec!["F1".into(), "V1".into()]),
                Row::new(vec!["F1".into(), "V2".into()]),
                Row::new(vec!["F1".into(), "V1".into()]),
                Row::new(vec!["F2".into(), "V1".into()]),
            ],
        )?;

        table.dedup();
        let once = table.clone();
        table.dedup();

        assert_eq!(table, once);
        assert_eq!(
            table.rows().iter().map(Row::to_strings).collect::<Vec<_>>(),
            vec![vec!["F1", "V1"], vec!["F1", "V2"], vec!["F2", "V1"]]
        );

        Ok(())
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut row = Row::new(vec!["1".into()]);
        row.set(3, "9".into());
        row.set(0, "2".into());
        assert_eq!(row.to_strings(), vec![String::from("2")]);
    }
}
