//! Typed views over the rows of interface and variant tables.
//!
//! A record keeps the fields that the mapper reasons about in typed form
//! and holds on to its full [`Row`] so that every auxiliary column can be
//! carried through to the output unchanged.

use std::str::FromStr;

use crate::Table;
use crate::table::Row;

pub mod interface;
pub mod variant;

pub use interface::InterfaceRecord;
pub use variant::ProteinPosition;
pub use variant::VariantRecord;

/// The column holding the protein identifier of an interface.
pub const PROTEIN_ACCESSION: &str = "Protein_accession";

/// The column holding the first residue of an interface range.
pub const PROTEIN_START_POSITION: &str = "Protein_start_position";

/// The column holding the last residue of an interface range.
pub const PROTEIN_END_POSITION: &str = "Protein_end_position";

/// The column holding the sequence identity percentage of an interface.
pub const PIDENT: &str = "Pident";

/// The column holding the structure feature identifier of an interface.
pub const STRUCTURE_FEATURE_ID: &str = "Structure_feature_id";

/// The column holding the protein position of a variant.
pub const PROTEIN_POSITION: &str = "Protein_position";

/// The column holding the transcript identifier of a variant.
pub const FEATURE: &str = "Feature";

/// The column holding the consequence terms of a variant.
pub const CONSEQUENCE: &str = "Consequence";

/// The column holding the uploaded identifier of a variant.
pub const UPLOADED_VARIATION: &str = "Uploaded_variation";

/// The column holding known identifiers co-located with a variant.
pub const EXISTING_VARIATION: &str = "Existing_variation";

/// The marker for an absent value in annotation output.
pub const MISSING_VALUE: &str = "-";

/// An error associated with parsing a record from a row.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    /// A required column is not present in the header.
    MissingColumn(String),

    /// A column holds a list where a single value is expected.
    ListValue(String),

    /// A numeric column holds a value that is not a number.
    InvalidNumber {
        /// The column.
        column: String,

        /// The offending value.
        value: String,
    },

    /// The start of an interface range is greater than its end.
    InvalidRange {
        /// The start of the range.
        start: u64,

        /// The end of the range.
        end: u64,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingColumn(column) => write!(f, "missing column: {column}"),
            ParseError::ListValue(column) => {
                write!(f, "column {column} holds a list where a single value is expected")
            }
            ParseError::InvalidNumber { column, value } => {
                write!(f, "invalid number in column {column}: \"{value}\"")
            }
            ParseError::InvalidRange { start, end } => write!(
                f,
                "invalid range: start position {start} is greater than end position {end}"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Typed records parsed from a table, together with the table's header.
#[derive(Clone, Debug)]
pub struct Records<R> {
    /// The column names shared by the rows of the records.
    header: Vec<String>,

    /// The records, in table order.
    records: Vec<R>,
}

impl<R> Records<R> {
    /// Gets the column names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Gets the records.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Gets the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Retains only the records for which `f` returns `true`.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&R) -> bool,
    {
        self.records.retain(f)
    }
}

/// Resolves the index of a required column.
pub(crate) fn required(table: &Table, column: &str) -> Result<usize, ParseError> {
    table
        .column(column)
        .ok_or_else(|| ParseError::MissingColumn(column.to_string()))
}

/// Gets the single value of a cell.
pub(crate) fn text<'r>(row: &'r Row, index: usize, column: &str) -> Result<&'r str, ParseError> {
    match row.get(index) {
        Some(cell) => cell
            .as_value()
            .ok_or_else(|| ParseError::ListValue(column.to_string())),
        None => Err(ParseError::MissingColumn(column.to_string())),
    }
}

/// Parses the single value of a cell as a number.
pub(crate) fn number<T>(row: &Row, index: usize, column: &str) -> Result<T, ParseError>
where
    T: FromStr,
{
    let value = text(row, index, column)?;

    value.trim().parse().map_err(|_| ParseError::InvalidNumber {
        column: column.to_string(),
        value: value.to_string(),
    })
}
