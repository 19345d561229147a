//! Expansion of multi-valued columns into one row per value.
//!
//! Compacted stores pack several values into one field, either as a native
//! list cell (`[F1, F2]`) or as a two-part dash-joined string (`120-135`).
//! Both encodings are first normalized into list cells; expansion then
//! replaces every row by one row per element, walking all targeted columns
//! in lockstep. Element `i` of column `A` is paired with element `i` of
//! column `B`. Columns are never cross-producted.
//!
//! ```text
//! Structure_feature_id  Protein_position      Structure_feature_id  Protein_position
//! [F1, F2]              [10, 12]          =>  F1                    10
//!                                             F2                    12
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::Table;
use crate::table;
use crate::table::Cell;

/// The delimiter joining the two parts of a dash-joined field.
const DASH: char = '-';

/// Matches a two-part dash-joined field such as `120-135` or `1abc-2xyz`.
static DASH_JOINED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.]+-[A-Za-z0-9.]+$").unwrap());

/// An error related to row expansion.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// Two targeted cells in the same row hold different numbers of values.
    LengthMismatch {
        /// The index of the offending row.
        row: usize,

        /// The offending column.
        column: String,

        /// The multiplicity established by an earlier column of the row.
        expected: usize,

        /// The number of values held by the offending cell.
        found: usize,
    },

    /// A table error.
    Table(table::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::LengthMismatch {
                row,
                column,
                expected,
                found,
            } => write!(
                f,
                "cannot expand row {row} in lockstep: column {column} holds {found} values, \
                 expected {expected}"
            ),
            Error::Table(err) => write!(f, "table error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Returns whether `value` is a two-part dash-joined field.
///
/// # Examples
///
/// ```
/// use pdbmapper::expand::is_dash_joined;
///
/// assert!(is_dash_joined("120-135"));
/// assert!(is_dash_joined("1abc-2xyz"));
/// assert!(!is_dash_joined("120"));
/// assert!(!is_dash_joined("1-2-3"));
/// assert!(!is_dash_joined("-"));
/// ```
pub fn is_dash_joined(value: &str) -> bool {
    DASH_JOINED.is_match(value)
}

/// Gets the columns in which at least one cell is a native list.
///
/// Single values in such a column are broadcast during expansion.
pub fn list_columns(table: &Table) -> Vec<String> {
    table
        .header()
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            table
                .rows()
                .iter()
                .any(|row| row.get(*i).is_some_and(Cell::is_list))
        })
        .map(|(_, name)| name.clone())
        .collect()
}

/// Gets the columns in which at least one cell is dash-joined.
pub fn dash_joined_columns(table: &Table) -> Vec<String> {
    table
        .header()
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            table
                .rows()
                .iter()
                .any(|row| row.value(*i).is_some_and(is_dash_joined))
        })
        .map(|(_, name)| name.clone())
        .collect()
}

/// Converts the dash-joined cells of `columns` into list cells.
///
/// Cells that are not dash-joined are left untouched.
pub fn split_dash_joined<S>(table: Table, columns: &[S]) -> Result<Table>
where
    S: AsRef<str>,
{
    let indices = column_indices(&table, columns)?;
    let (header, mut rows) = table.into_parts();

    for row in rows.iter_mut() {
        for &i in &indices {
            let parts = match row.value(i) {
                Some(value) if is_dash_joined(value) => {
                    value.split(DASH).map(String::from).collect::<Vec<_>>()
                }
                _ => continue,
            };

            if let Some(values) = nonempty::NonEmpty::from_vec(parts) {
                row.set(i, Cell::List(values));
            }
        }
    }

    Table::try_from_parts(header, rows).map_err(Error::Table)
}

/// Expands every row into one row per element of the targeted `columns`.
///
/// The targeted cells of a row are walked in lockstep. A single-valued
/// cell is repeated across the row's multiplicity; two cells holding
/// different numbers of values (both above one) is an error. All other
/// columns are copied unchanged, and the children of a row are emitted
/// contiguously in the position of their parent.
///
/// # Examples
///
/// ```
/// use pdbmapper::expand;
/// use pdbmapper::table::Cell;
/// use pdbmapper::table::Row;
/// use pdbmapper::Table;
///
/// let table = Table::try_from_parts(
///     vec![String::from("Protein_accession"), String::from("Structure_feature_id")],
///     vec![Row::new(vec!["ENSP01".into(), Cell::parse("[F1, F2, F3]")])],
/// )?;
///
/// let table = expand::expand(table, &["Structure_feature_id"])?;
/// assert_eq!(table.len(), 3);
///
/// let features = table.rows().iter().filter_map(|row| row.value(1)).collect::<Vec<_>>();
/// assert_eq!(features, vec!["F1", "F2", "F3"]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn expand<S>(table: Table, columns: &[S]) -> Result<Table>
where
    S: AsRef<str>,
{
    let indices = column_indices(&table, columns)?;
    let (header, rows) = table.into_parts();

    let mut expanded = Vec::with_capacity(rows.len());

    for (row_index, row) in rows.into_iter().enumerate() {
        // (1) Establish the multiplicity of the row from its targeted cells.
        let mut multiplicity = 1;

        for &i in &indices {
            let found = row.get(i).map(Cell::len).unwrap_or(1);

            if found == 1 || found == multiplicity {
                continue;
            }

            if multiplicity != 1 {
                return Err(Error::LengthMismatch {
                    row: row_index,
                    column: header[i].clone(),
                    expected: multiplicity,
                    found,
                });
            }

            multiplicity = found;
        }

        // (2) Emit one child per element, taking element `k` of every
        // targeted cell (or its only element).
        for k in 0..multiplicity {
            let mut child = row.clone();

            for &i in &indices {
                let value = row.get(i).and_then(|cell| match cell.len() {
                    1 => cell.values().next(),
                    _ => cell.values().nth(k),
                });

                if let Some(value) = value {
                    child.set(i, Cell::from(value));
                }
            }

            expanded.push(child);
        }
    }

    Table::try_from_parts(header, expanded).map_err(Error::Table)
}

/// Normalizes and expands every multi-valued column of a compacted table.
///
/// Dash-joined columns are split into lists, then all dash-joined and list
/// columns are expanded together in lockstep.
///
/// # Examples
///
/// ```
/// use pdbmapper::expand;
/// use pdbmapper::table::Row;
/// use pdbmapper::Table;
///
/// let table = Table::try_from_parts(
///     vec![String::from("Structure_feature_id"), String::from("Protein_position")],
///     vec![
///         Row::new(vec!["F1".into(), "120-135".into()]),
///         Row::new(vec!["F2".into(), "140".into()]),
///     ],
/// )?;
///
/// let table = expand::explode(table)?;
/// let rows = table.rows().iter().map(Row::to_strings).collect::<Vec<_>>();
/// assert_eq!(rows, vec![
///     vec!["F1", "120"],
///     vec!["F1", "135"],
///     vec!["F2", "140"],
/// ]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn explode(table: Table) -> Result<Table> {
    let dash_joined = dash_joined_columns(&table);

    let mut targeted = list_columns(&table);
    for column in &dash_joined {
        if !targeted.contains(column) {
            targeted.push(column.clone());
        }
    }

    if targeted.is_empty() {
        return Ok(table);
    }

    let table = split_dash_joined(table, &dash_joined)?;
    expand(table, &targeted)
}

/// Resolves column names to their indices.
fn column_indices<S>(table: &Table, columns: &[S]) -> Result<Vec<usize>>
where
    S: AsRef<str>,
{
    let mut indices = Vec::with_capacity(columns.len());

    for column in columns {
        let i = table
            .require_column(column.as_ref())
            .map_err(Error::Table)?;

        if !indices.contains(&i) {
            indices.push(i);
        }
    }

    Ok(indices)
}
