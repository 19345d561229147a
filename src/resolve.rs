//! Resolution of protein-position ranges into explicit positions.
//!
//! Variant annotations report multi-residue variants as a range
//! (`120-123`), and either bound may be unknown (`?-135`). A range is
//! replaced by one row per position it covers. An unknown bound collapses
//! onto the known one, so `?-135` resolves to the single position `135`.
//! This discards the true uncertain extent of the range.

use std::sync::LazyLock;

use nonempty::NonEmpty;
use regex::Regex;

use crate::Table;
use crate::expand;
use crate::table::Cell;

/// The placeholder for an unknown range bound.
pub const UNKNOWN_BOUND: &str = "?";

/// Matches a protein-position range, either bound of which may be unknown.
static RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+|\?)-(\d+|\?)$").unwrap());

/// An error related to resolving ranges.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// A range bound could not be parsed as a position.
    InvalidBound(String),

    /// The start of a range is greater than its end.
    Reversed {
        /// The start of the range.
        start: u64,

        /// The end of the range.
        end: u64,
    },

    /// An error expanding the resolved positions.
    Expand(expand::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidBound(value) => write!(f, "invalid range bound: {value}"),
            Error::Reversed { start, end } => {
                write!(f, "range start {start} is greater than range end {end}")
            }
            Error::Expand(err) => write!(f, "expansion error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Parses a textual range into its inclusive bounds.
///
/// Returns [`None`] if `value` is not a range or if both bounds are unknown.
///
/// # Examples
///
/// ```
/// use pdbmapper::resolve::parse_range;
///
/// assert_eq!(parse_range("120-123")?, Some((120, 123)));
/// assert_eq!(parse_range("?-135")?, Some((135, 135)));
/// assert_eq!(parse_range("88-?")?, Some((88, 88)));
/// assert_eq!(parse_range("?-?")?, None);
/// assert_eq!(parse_range("140")?, None);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_range(value: &str) -> Result<Option<(u64, u64)>> {
    let captures = match RANGE.captures(value) {
        Some(captures) => captures,
        None => return Ok(None),
    };

    let start = parse_bound(&captures[1])?;
    let end = parse_bound(&captures[2])?;

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, start),
        (None, Some(end)) => (end, end),
        (None, None) => return Ok(None),
    };

    if start > end {
        return Err(Error::Reversed { start, end });
    }

    Ok(Some((start, end)))
}

/// Parses a single range bound, mapping the placeholder to [`None`].
fn parse_bound(value: &str) -> Result<Option<u64>> {
    if value == UNKNOWN_BOUND {
        return Ok(None);
    }

    value
        .parse()
        .map(Some)
        .map_err(|_| Error::InvalidBound(value.to_string()))
}

/// Replaces every range in `column` with one row per resolved position.
///
/// Rows whose cell is not a range pass through unchanged. The children of
/// a range are emitted contiguously and in ascending order.
///
/// # Examples
///
/// ```
/// use pdbmapper::resolve;
/// use pdbmapper::table::Row;
/// use pdbmapper::Table;
///
/// let table = Table::try_from_parts(
///     vec![String::from("Uploaded_variation"), String::from("Protein_position")],
///     vec![
///         Row::new(vec!["rs1".into(), "120-122".into()]),
///         Row::new(vec!["rs2".into(), "140".into()]),
///     ],
/// )?;
///
/// let table = resolve::resolve(table, "Protein_position")?;
/// let positions = table.rows().iter().filter_map(|row| row.value(1)).collect::<Vec<_>>();
/// assert_eq!(positions, vec!["120", "121", "122", "140"]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn resolve(table: Table, column: &str) -> Result<Table> {
    let index = table
        .require_column(column)
        .map_err(|err| Error::Expand(expand::Error::Table(err)))?;

    let (header, mut rows) = table.into_parts();
    let mut ranges = 0usize;

    for row in rows.iter_mut() {
        let (start, end) = match row.value(index).map(parse_range).transpose()?.flatten() {
            Some(bounds) => bounds,
            None => continue,
        };

        let positions = (start..=end).map(|position| position.to_string()).collect();

        if let Some(positions) = NonEmpty::from_vec(positions) {
            row.set(index, Cell::List(positions));
            ranges += 1;
        }
    }

    let table = Table::try_from_parts(header, rows)
        .map_err(|err| Error::Expand(expand::Error::Table(err)))?;

    if ranges == 0 {
        return Ok(table);
    }

    tracing::debug!(column, ranges, "resolving protein position ranges");
    expand::expand(table, &[column]).map_err(Error::Expand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    fn variants(positions: &[&str]) -> Table {
        Table::try_from_parts(
            vec![
                String::from("Uploaded_variation"),
                String::from("Protein_position"),
            ],
            positions
                .iter()
                .enumerate()
                .map(|(i, position)| Row::new(vec![format!("V{i}").into(), (*position).into()]))
                .collect(),
        )
        .unwrap()
    }

    fn positions(table: &Table) -> Vec<String> {
        table
            .rows()
            .iter()
            .filter_map(|row| row.value(1))
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_closed_range_yields_one_row_per_position()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = resolve(variants(&["120-123"]), "Protein_position")?;
        assert_eq!(positions(&table), vec!["120", "121", "122", "123"]);
        assert!(table.rows().iter().all(|row| row.value(0) == Some("V0")));
        Ok(())
    }

    #[test]
    fn test_open_range_collapses_to_known_bound()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = resolve(variants(&["?-135"]), "Protein_position")?;
        assert_eq!(positions(&table), vec!["135"]);
        Ok(())
    }

    #[test]
    fn test_scalars_and_placeholders_pass_through()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = resolve(variants(&["140", "-", "?-?", ""]), "Protein_position")?;
        assert_eq!(positions(&table), vec!["140", "-", "?-?", ""]);
        Ok(())
    }

    #[test]
    fn test_children_stay_in_parent_position()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = resolve(variants(&["5", "7-8", "9"]), "Protein_position")?;
        let ids = table
            .rows()
            .iter()
            .filter_map(|row| row.value(0))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["V0", "V1", "V1", "V2"]);
        assert_eq!(positions(&table), vec!["5", "7", "8", "9"]);
        Ok(())
    }

    #[test]
    fn test_reversed_range() {
        let err = resolve(variants(&["12-10"]), "Protein_position").unwrap_err();
        assert_eq!(err.to_string(), "range start 12 is greater than range end 10");
    }

    #[test]
    fn test_missing_column() {
        let err = resolve(variants(&["1"]), "Amino_acids").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expansion error: table error: missing column: Amino_acids"
        );
    }
}
